//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded scene values

/// Remote equirectangular environment image (Radiance HDR)
pub const ENVIRONMENT_URL: &str =
    "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/venice_sunset_1k.hdr";

/// Window sizing constants
pub mod window {
    /// Initial inner size of the native window
    pub const DEFAULT_SIZE: [f32; 2] = [1280.0, 800.0];

    /// Minimum inner size of the native window
    pub const MIN_SIZE: [f32; 2] = [320.0, 240.0];
}

/// Camera constants
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 75.0;

    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;

    /// Fixed offset of the camera from the origin
    pub const POSITION: [f32; 3] = [0.0, 0.0, 5.0];
}

/// Orbit controller constants
pub mod controls {
    /// Fraction of the pending motion applied per update
    pub const DAMPING_FACTOR: f32 = 0.05;

    pub const ROTATE_SPEED: f32 = 1.0;
    pub const ZOOM_SPEED: f32 = 1.0;
    pub const PAN_SPEED: f32 = 1.0;

    pub const MIN_DISTANCE: f32 = 1.5;
    pub const MAX_DISTANCE: f32 = 50.0;

    /// Scroll distance (points) that counts as one wheel notch
    pub const SCROLL_NOTCH: f32 = 50.0;
}

/// Sphere layout and animation constants
pub mod spheres {
    pub const RADIUS: f32 = 1.0;
    pub const SEGMENTS: u32 = 64;
    pub const RINGS: u32 = 64;

    /// Horizontal distance of each sphere from the origin
    pub const OFFSET_X: f32 = 1.5;

    /// Amplitude of the vertical bob
    pub const BOB_AMPLITUDE: f32 = 0.2;

    /// Phase of the right sphere's bob relative to the left one
    pub const BOB_PHASE: f32 = std::f32::consts::FRAC_PI_2;
}

/// Render surface constants
pub mod surface {
    /// Device pixel ratio is never allowed above this
    pub const MAX_PIXEL_RATIO: f32 = 2.0;

    pub const DEFAULT_EXPOSURE: f32 = 1.0;
    pub const EXPOSURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

    /// Background used while no environment is loaded (linear RGB)
    pub const CLEAR_COLOR: [f64; 3] = [0.02, 0.02, 0.025];
}

/// Parameter panel constants
pub mod panel {
    pub const DEFAULT_WIDTH: f32 = 260.0;
    pub const ROTATION_RANGE_DEGREES: std::ops::RangeInclusive<f32> = 0.0..=360.0;
    pub const UNIT_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;
}
