//! Perspective camera

use crate::constants;
use glam::{Mat4, Vec3};

/// Perspective camera looking at `target`
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(constants::camera::POSITION),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: constants::camera::FOV_DEGREES.to_radians(),
            near: constants::camera::NEAR,
            far: constants::camera::FAR,
            aspect: 1.0,
        }
    }
}

impl Camera3D {
    pub fn new(position: Vec3, fov_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            fov: fov_degrees.to_radians(),
            aspect,
            ..Self::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.target - self.position).length()
    }

    /// Camera basis: (right, up) in world space
    pub fn screen_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera3D::new(Vec3::new(0.0, 0.0, 5.0), 75.0, 16.0 / 9.0);
        let ndc = camera.build_view_projection_matrix().project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_invalid_aspect_is_ignored() {
        let mut camera = Camera3D::default();
        camera.set_aspect(2.0);
        camera.set_aspect(f32::NAN);
        camera.set_aspect(0.0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_default_uses_scene_constants() {
        let camera = Camera3D::default();
        assert_eq!(camera.position, Vec3::from_array(constants::camera::POSITION));
        assert_eq!(camera.near, constants::camera::NEAR);
        assert_eq!(camera.far, constants::camera::FAR);
        assert!((camera.fov - constants::camera::FOV_DEGREES.to_radians()).abs() < 1e-6);
        assert!((camera.distance_to_target() - 5.0).abs() < 1e-6);
    }
}
