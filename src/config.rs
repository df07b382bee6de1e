//! Viewer configuration
//!
//! There is no config file; everything tunable is collected in [`ViewerConfig`] whose
//! `Default` is built from [`crate::constants`].

use crate::constants;
use crate::scene::Material;

/// Tunables for one viewport session
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Where the environment image is fetched from
    pub environment_url: String,
    pub camera_position: glam::Vec3,
    pub fov_degrees: f32,
    pub sphere_radius: f32,
    pub sphere_offset_x: f32,
    pub bob_amplitude: f32,
    pub bob_phase: f32,
    pub max_pixel_ratio: f32,
    pub exposure: f32,
    pub left_material: Material,
    pub right_material: Material,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            environment_url: constants::ENVIRONMENT_URL.to_string(),
            camera_position: glam::Vec3::from_array(constants::camera::POSITION),
            fov_degrees: constants::camera::FOV_DEGREES,
            sphere_radius: constants::spheres::RADIUS,
            sphere_offset_x: constants::spheres::OFFSET_X,
            bob_amplitude: constants::spheres::BOB_AMPLITUDE,
            bob_phase: constants::spheres::BOB_PHASE,
            max_pixel_ratio: constants::surface::MAX_PIXEL_RATIO,
            exposure: constants::surface::DEFAULT_EXPOSURE,
            left_material: Material::chrome(),
            right_material: Material::gold(),
        }
    }
}
