//! wgpu renderer for the sphere preview
//!
//! The scene is drawn into an offscreen HDR target sized by the render surface (sky
//! first, then the spheres with depth testing), and then tone mapped into egui's pass.

use super::config::GraphicsConfig;
use crate::constants;
use crate::environment::EnvironmentMap;
use crate::scene::{Mesh3D, Vertex3D};
use crate::session::FrameState;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use log::{debug, error, info};
use std::mem;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub sky_inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub environment_rotation: f32,
    pub background_rotation: f32,
    pub has_environment: f32,
    pub max_lod: f32,
    pub fallback_ambient: f32,
    pub clear_color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub color_metalness: [f32; 4],
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PresentUniforms {
    pub exposure: f32,
    pub tone_mapping: u32,
    pub encode_srgb: u32,
    pub _padding: f32,
}

/// Ambient level used while no environment is loaded
const FALLBACK_AMBIENT: f32 = 0.03;

impl FrameUniforms {
    /// `has_environment` reflects what is actually bound, which can lag the scene
    pub fn from_frame(frame: &FrameState, has_environment: bool, max_lod: f32) -> Self {
        // Rotation-only view, so sky directions don't depend on the camera position
        let sky_view = Mat4::from_mat3(Mat3::from_mat4(frame.view));
        let sky_inv_view_proj = (frame.projection * sky_view).inverse();
        let clear = constants::surface::CLEAR_COLOR;

        Self {
            view_proj: (frame.projection * frame.view).to_cols_array_2d(),
            sky_inv_view_proj: sky_inv_view_proj.to_cols_array_2d(),
            camera_pos: frame.camera_position.to_array(),
            environment_rotation: frame.environment_rotation,
            background_rotation: frame.background_rotation,
            has_environment: if has_environment { 1.0 } else { 0.0 },
            max_lod,
            fallback_ambient: FALLBACK_AMBIENT,
            clear_color: [clear[0] as f32, clear[1] as f32, clear[2] as f32, 1.0],
        }
    }
}

struct ObjectGpu {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct EnvironmentGpu {
    texture: wgpu::Texture,
    mip_level_count: u32,
}

struct OffscreenTargets {
    size: [u32; 2],
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    present_bind_group: wgpu::BindGroup,
}

impl OffscreenTargets {
    fn destroy(self) {
        self.color.destroy();
        self.depth.destroy();
    }
}

/// Renderer for the preview scene
pub struct SceneRenderer {
    config: GraphicsConfig,
    sky_pipeline: wgpu::RenderPipeline,
    sphere_pipeline: wgpu::RenderPipeline,
    present_pipeline: wgpu::RenderPipeline,
    frame_layout: wgpu::BindGroupLayout,
    present_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    present_buffer: wgpu::Buffer,
    env_sampler: wgpu::Sampler,
    hdr_sampler: wgpu::Sampler,
    fallback_environment: wgpu::Texture,
    frame_bind_group: wgpu::BindGroup,
    objects: Vec<ObjectGpu>,
    sphere_vertex_buffer: Option<wgpu::Buffer>,
    sphere_index_buffer: Option<wgpu::Buffer>,
    sphere_index_count: u32,
    environment: Option<EnvironmentGpu>,
    targets: Option<OffscreenTargets>,
    /// Set when an environment could not be uploaded; it is not retried
    environment_rejected: bool,
    released: bool,
}

impl std::fmt::Debug for SceneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRenderer")
            .field("config", &self.config)
            .field("has_environment", &self.environment.is_some())
            .field("target_size", &self.targets.as_ref().map(|t| t.size))
            .field("released", &self.released)
            .finish()
    }
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, config: GraphicsConfig) -> Self {
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Preview Frame Uniforms"),
            size: mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let present_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Preview Present Uniforms"),
            size: mem::size_of::<PresentUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Frame Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Object Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT)],
        });

        let present_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Present Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let hdr_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Preview HDR Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Zero-initialized stand-in so the frame bind group is valid before loading
        let fallback_environment = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Fallback Environment"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.hdr_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let frame_bind_group = create_frame_bind_group(
            device,
            &frame_layout,
            &frame_buffer,
            &fallback_environment,
            &env_sampler,
        );

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Preview Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let present_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Preview Present Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/present.wgsl").into()),
        });

        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preview Sky Pipeline Layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });

        let sphere_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preview Sphere Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let present_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preview Present Pipeline Layout"),
            bind_group_layouts: &[&present_layout],
            push_constant_ranges: &[],
        });

        let sky_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Preview Sky Pipeline"),
            layout: Some(&sky_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_sky"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_sky"),
                targets: &[Some(config.hdr_target_state())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            // Background never occludes: always passes, never writes
            depth_stencil: Some(wgpu::DepthStencilState {
                format: config.depth_format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: config.multisample_state(),
            multiview: None,
        });

        let sphere_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Preview Sphere Pipeline"),
            layout: Some(&sphere_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_sphere"),
                buffers: &[Vertex3D::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_sphere"),
                targets: &[Some(config.hdr_target_state())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: config.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: config.multisample_state(),
            multiview: None,
        });

        let present_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Preview Present Pipeline"),
            layout: Some(&present_pipeline_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &present_shader,
                entry_point: Some("vs_present"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &present_shader,
                entry_point: Some("fs_present"),
                targets: &[Some(config.color_target_state())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None, // egui's pass has no depth attachment
            multisample: config.multisample_state(),
            multiview: None,
        });

        let objects = (0..2)
            .map(|i| {
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(if i == 0 { "Left Sphere Uniforms" } else { "Right Sphere Uniforms" }),
                    size: mem::size_of::<ObjectUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Preview Object Bind Group"),
                    layout: &object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                ObjectGpu { uniform_buffer, bind_group }
            })
            .collect();

        // Spheres share one unit mesh, scaled by each object's model matrix
        let mesh = Mesh3D::sphere(1.0, constants::spheres::SEGMENTS, constants::spheres::RINGS);
        let sphere_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        info!("Scene renderer ready (target {:?})", config.target_format);

        Self {
            config,
            sky_pipeline,
            sphere_pipeline,
            present_pipeline,
            frame_layout,
            present_layout,
            frame_buffer,
            present_buffer,
            env_sampler,
            hdr_sampler,
            fallback_environment,
            frame_bind_group,
            objects,
            sphere_vertex_buffer: Some(sphere_vertex_buffer),
            sphere_index_buffer: Some(sphere_index_buffer),
            sphere_index_count: mesh.index_count(),
            environment: None,
            targets: None,
            environment_rejected: false,
            released: false,
        }
    }

    /// Uploads state for `frame` and records the offscreen scene pass into `encoder`.
    /// Callers skip this once the renderer is released.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameState,
    ) {
        self.ensure_targets(device, frame.physical_size);
        if let Some(environment) = &frame.environment {
            self.ensure_environment(device, queue, environment);
        }
        self.write_uniforms(queue, frame);
        self.render_offscreen(encoder);
    }

    /// Tone maps the offscreen scene into egui's render pass
    pub fn paint(&self, render_pass: &mut wgpu::RenderPass<'static>) {
        if let Some(targets) = &self.targets {
            render_pass.set_pipeline(&self.present_pipeline);
            render_pass.set_bind_group(0, &targets.present_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
    }

    fn ensure_targets(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        if self.targets.as_ref().is_some_and(|t| t.size == size) {
            return;
        }
        if let Some(old) = self.targets.take() {
            old.destroy();
        }

        let extent = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Preview HDR Color"),
            size: extent,
            mip_level_count: 1,
            sample_count: self.config.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.hdr_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Preview Depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: self.config.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let present_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preview Present Bind Group"),
            layout: &self.present_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.hdr_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.present_buffer.as_entire_binding(),
                },
            ],
        });

        debug!("Allocated offscreen targets {}x{}", extent.width, extent.height);
        self.targets = Some(OffscreenTargets {
            size,
            color,
            color_view,
            depth,
            depth_view,
            present_bind_group,
        });
    }

    /// Uploads the environment once; later frames reuse it
    fn ensure_environment(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, environment: &EnvironmentMap) {
        if self.environment.is_some() || self.environment_rejected {
            return;
        }

        let max_dimension = device.limits().max_texture_dimension_2d;
        if !fits_texture_limit(environment.width(), environment.height(), max_dimension) {
            error!(
                "Environment {}x{} exceeds the device texture limit of {}; continuing without it",
                environment.width(),
                environment.height(),
                max_dimension
            );
            self.environment_rejected = true;
            return;
        }

        let mip_level_count = environment.mip_level_count();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Map"),
            size: wgpu::Extent3d {
                width: environment.width(),
                height: environment.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.hdr_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (index, level) in environment.levels().iter().enumerate() {
            let texels = environment.level_as_f16(index);
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: index as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                bytemuck::cast_slice(&texels),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.width * 4 * mem::size_of::<half::f16>() as u32),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        self.frame_bind_group = create_frame_bind_group(
            device,
            &self.frame_layout,
            &self.frame_buffer,
            &texture,
            &self.env_sampler,
        );
        info!(
            "Uploaded environment {}x{} with {} mip levels",
            environment.width(),
            environment.height(),
            mip_level_count
        );
        self.environment = Some(EnvironmentGpu { texture, mip_level_count });
    }

    fn write_uniforms(&self, queue: &wgpu::Queue, frame: &FrameState) {
        let max_lod = self
            .environment
            .as_ref()
            .map(|e| e.mip_level_count.saturating_sub(1) as f32)
            .unwrap_or(0.0);
        let frame_uniforms = FrameUniforms::from_frame(frame, self.environment.is_some(), max_lod);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame_uniforms]));

        for (gpu, object) in self.objects.iter().zip(frame.objects.iter()) {
            let material = object.material;
            let uniforms = ObjectUniforms {
                model: object.model.to_cols_array_2d(),
                color_metalness: [material.color[0], material.color[1], material.color[2], material.metalness],
                params: [material.roughness, 0.0, 0.0, 0.0],
            };
            queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        let present = PresentUniforms {
            exposure: frame.exposure,
            tone_mapping: frame.tone_mapping.shader_id(),
            encode_srgb: self.config.needs_srgb_encode() as u32,
            _padding: 0.0,
        };
        queue.write_buffer(&self.present_buffer, 0, bytemuck::cast_slice(&[present]));
    }

    fn render_offscreen(&self, encoder: &mut wgpu::CommandEncoder) {
        let Some(targets) = &self.targets else {
            return;
        };
        let clear = constants::surface::CLEAR_COLOR;

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Preview Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear[0],
                        g: clear[1],
                        b: clear[2],
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.sky_pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.draw(0..3, 0..1);

        if let (Some(vertex_buffer), Some(index_buffer)) = (&self.sphere_vertex_buffer, &self.sphere_index_buffer) {
            pass.set_pipeline(&self.sphere_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for object in &self.objects {
                pass.set_bind_group(1, &object.bind_group, &[]);
                pass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
            }
        }
    }

    /// Releases GPU resources. Returns whether an environment texture was released.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        if let Some(targets) = self.targets.take() {
            targets.destroy();
        }
        if let Some(buffer) = self.sphere_vertex_buffer.take() {
            buffer.destroy();
        }
        if let Some(buffer) = self.sphere_index_buffer.take() {
            buffer.destroy();
        }
        for object in self.objects.drain(..) {
            object.uniform_buffer.destroy();
        }
        self.fallback_environment.destroy();

        let environment_released = match self.environment.take() {
            Some(environment) => {
                environment.texture.destroy();
                true
            }
            None => false,
        };
        info!("Scene renderer released (environment texture: {})", environment_released);
        environment_released
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

fn fits_texture_limit(width: u32, height: u32, max_dimension: u32) -> bool {
    width <= max_dimension && height <= max_dimension
}

fn create_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    environment: &wgpu::Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let view = environment.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Preview Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_shader_layout() {
        assert_eq!(mem::size_of::<FrameUniforms>(), 176);
        assert_eq!(mem::size_of::<ObjectUniforms>(), 96);
        assert_eq!(mem::size_of::<PresentUniforms>(), 16);
    }

    #[test]
    fn test_sky_matrix_ignores_camera_translation() {
        use crate::config::ViewerConfig;
        use crate::session::ViewportSession;

        let mut session = ViewportSession::mount(ViewerConfig::default(), 800.0, 600.0, 1.0);
        let frame = session.step_at(0.0).unwrap();
        let uniforms = FrameUniforms::from_frame(&frame, false, 0.0);

        // The centre of the screen looks down the camera's forward axis (-Z here)
        let inv = Mat4::from_cols_array_2d(&uniforms.sky_inv_view_proj);
        let world = inv * glam::Vec4::new(0.0, 0.0, 1.0, 1.0);
        let dir = (world.truncate() / world.w).normalize();
        assert!((dir - glam::Vec3::NEG_Z).length() < 1e-3);
        assert_eq!(uniforms.has_environment, 0.0);
    }

    #[test]
    fn test_oversized_environment_is_rejected() {
        assert!(fits_texture_limit(1024, 512, 8192));
        assert!(fits_texture_limit(8192, 4096, 8192));
        assert!(!fits_texture_limit(16384, 8192, 8192));
        assert!(!fits_texture_limit(4096, 8193, 8192));
    }

    #[test]
    fn test_environment_flag_follows_bound_texture() {
        use crate::config::ViewerConfig;
        use crate::environment::EnvironmentMap;
        use crate::session::ViewportSession;
        use std::sync::Arc;

        let mut session = ViewportSession::mount(ViewerConfig::default(), 800.0, 600.0, 1.0);
        let mut frame = session.step_at(0.0).unwrap();
        frame.environment = Some(Arc::new(EnvironmentMap::solid(8, 4, [1.0, 1.0, 1.0])));

        // A scene environment that never reached the GPU still renders as absent
        assert_eq!(FrameUniforms::from_frame(&frame, false, 0.0).has_environment, 0.0);
        assert_eq!(FrameUniforms::from_frame(&frame, true, 3.0).has_environment, 1.0);
    }
}
