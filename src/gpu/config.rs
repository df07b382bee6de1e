//! Centralized graphics configuration for consistent wgpu settings

/// Graphics configuration shared by every pipeline
#[derive(Debug, Clone, Copy)]
pub struct GraphicsConfig {
    pub sample_count: u32,
    /// Format of the egui target the preview is presented into
    pub target_format: wgpu::TextureFormat,
    /// Offscreen scene color, before tone mapping
    pub hdr_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

impl GraphicsConfig {
    pub fn for_target(target_format: wgpu::TextureFormat) -> Self {
        Self {
            sample_count: 1, // eframe runs without multisampling
            target_format,
            hdr_format: wgpu::TextureFormat::Rgba16Float,
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }

    /// Whether the present shader has to encode sRGB itself
    pub fn needs_srgb_encode(&self) -> bool {
        !self.target_format.is_srgb()
    }

    /// Create multisample state from config
    pub fn multisample_state(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }

    /// Color target for presenting into egui's pass
    pub fn color_target_state(&self) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format: self.target_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }

    /// Color target for the offscreen scene pass
    pub fn hdr_target_state(&self) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format: self.hdr_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_encode_only_for_linear_targets() {
        assert!(GraphicsConfig::for_target(wgpu::TextureFormat::Bgra8Unorm).needs_srgb_encode());
        assert!(!GraphicsConfig::for_target(wgpu::TextureFormat::Bgra8UnormSrgb).needs_srgb_encode());
    }
}
