//! Mesh data and sphere generation

use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;
use std::mem;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone)]
pub struct Mesh3D {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl Mesh3D {
    /// UV sphere centred on the origin.
    ///
    /// `segments` runs around the equator, `rings` from pole to pole. Triangles are
    /// wound counter-clockwise when seen from outside.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);

        for i in 0..=rings {
            let v = i as f32 / rings as f32;
            let theta = v * PI;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for j in 0..=segments {
                let u = j as f32 / segments as f32;
                let phi = u * 2.0 * PI;
                let (sin_phi, cos_phi) = phi.sin_cos();

                let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
                vertices.push(Vertex3D {
                    position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                    normal,
                    uv: [u, v],
                });
            }
        }

        for i in 0..rings {
            for j in 0..segments {
                let first = i * (segments + 1) + j;
                let second = first + segments + 1;

                indices.extend_from_slice(&[first, first + 1, second]);
                indices.extend_from_slice(&[second, first + 1, second + 1]);
            }
        }

        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_sphere_counts() {
        let mesh = Mesh3D::sphere(1.0, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.indices.len(), 16 * 8 * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_sphere_normals_and_radius() {
        let mesh = Mesh3D::sphere(2.5, 12, 6);
        for vertex in &mesh.vertices {
            let normal = Vec3::from_array(vertex.normal);
            let position = Vec3::from_array(vertex.position);
            assert!((normal.length() - 1.0).abs() < 1e-4);
            assert!((position.length() - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let mesh = Mesh3D::sphere(1.0, 24, 12);
        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from_array(mesh.vertices[tri[0] as usize].position);
            let b = Vec3::from_array(mesh.vertices[tri[1] as usize].position);
            let c = Vec3::from_array(mesh.vertices[tri[2] as usize].position);
            let face_normal = (b - a).cross(c - a);
            // Triangles touching a pole collapse to zero area
            if face_normal.length() < 1e-6 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }
}
