//! Render surface settings
//!
//! The surface is the offscreen HDR target the scene is drawn into before tone mapping.
//! Its physical size follows the viewport, scaled by a pixel ratio that never exceeds
//! `max_pixel_ratio`.

/// Tone mapping operator applied when the HDR surface is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapping {
    /// Filmic ACES fit
    AcesFilmic,
}

impl ToneMapping {
    /// Operator id understood by the present shader
    pub fn shader_id(self) -> u32 {
        match self {
            ToneMapping::AcesFilmic => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSurface {
    /// Viewport size in logical points
    logical_size: [f32; 2],
    native_pixel_ratio: f32,
    max_pixel_ratio: f32,
    pub tone_mapping: ToneMapping,
    /// Tone mapping exposure, linear scale
    pub exposure: f32,
    attached: bool,
}

impl RenderSurface {
    pub fn new(width: f32, height: f32, native_pixel_ratio: f32, max_pixel_ratio: f32, exposure: f32) -> Self {
        Self {
            logical_size: [width.max(1.0), height.max(1.0)],
            native_pixel_ratio: sanitize_ratio(native_pixel_ratio),
            max_pixel_ratio: sanitize_ratio(max_pixel_ratio),
            tone_mapping: ToneMapping::AcesFilmic,
            exposure,
            attached: false,
        }
    }

    /// Native ratio capped at the maximum
    pub fn pixel_ratio(&self) -> f32 {
        self.native_pixel_ratio.min(self.max_pixel_ratio)
    }

    pub fn logical_size(&self) -> [f32; 2] {
        self.logical_size
    }

    /// Size of the backing target in pixels, never zero
    pub fn physical_size(&self) -> [u32; 2] {
        let ratio = self.pixel_ratio();
        [
            ((self.logical_size[0] * ratio).round() as u32).max(1),
            ((self.logical_size[1] * ratio).round() as u32).max(1),
        ]
    }

    pub fn aspect(&self) -> f32 {
        self.logical_size[0] / self.logical_size[1]
    }

    /// Applies new viewport dimensions. Returns whether anything changed.
    pub fn set_size(&mut self, width: f32, height: f32, native_pixel_ratio: f32) -> bool {
        let logical_size = [width.max(1.0), height.max(1.0)];
        let native_pixel_ratio = sanitize_ratio(native_pixel_ratio);
        let changed = logical_size != self.logical_size || native_pixel_ratio != self.native_pixel_ratio;
        self.logical_size = logical_size;
        self.native_pixel_ratio = native_pixel_ratio;
        changed
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}
