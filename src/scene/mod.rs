//! Scene graph for the preview: two spheres and an optional environment

pub mod material;
pub mod mesh;
pub mod object;

pub use material::Material;
pub use mesh::{Mesh3D, Vertex3D};
pub use object::{bob_offset, Renderable, Side};

use crate::config::ViewerConfig;
use crate::environment::EnvironmentMap;
use std::sync::Arc;

/// Scene root
#[derive(Debug)]
pub struct Scene {
    objects: [Renderable; 2],
    /// Background and lighting source once loaded
    environment: Option<Arc<EnvironmentMap>>,
    /// Rotation about +Y applied to the background, radians
    pub background_rotation: f32,
    /// Rotation about +Y applied to environment lighting, radians
    pub environment_rotation: f32,
}

impl Scene {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            objects: [
                Renderable::new(
                    Side::Left,
                    config.sphere_offset_x,
                    config.sphere_radius,
                    config.left_material,
                ),
                Renderable::new(
                    Side::Right,
                    config.sphere_offset_x,
                    config.sphere_radius,
                    config.right_material,
                ),
            ],
            environment: None,
            background_rotation: 0.0,
            environment_rotation: 0.0,
        }
    }

    pub fn object(&self, side: Side) -> &Renderable {
        &self.objects[side.index()]
    }

    pub fn object_mut(&mut self, side: Side) -> &mut Renderable {
        &mut self.objects[side.index()]
    }

    pub fn objects(&self) -> &[Renderable; 2] {
        &self.objects
    }

    /// Sets each object's vertical offset for `elapsed` seconds.
    /// The right object runs `phase` radians ahead of the left one.
    pub fn animate(&mut self, elapsed: f32, amplitude: f32, phase: f32) {
        self.objects[Side::Left.index()].vertical_offset = bob_offset(elapsed, amplitude, 0.0);
        self.objects[Side::Right.index()].vertical_offset = bob_offset(elapsed, amplitude, phase);
    }

    /// Installs the environment as background and lighting source.
    ///
    /// Returns `false` without replacing anything if one is already installed.
    pub fn set_environment(&mut self, environment: Arc<EnvironmentMap>) -> bool {
        if self.environment.is_some() {
            return false;
        }
        self.environment = Some(environment);
        true
    }

    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    pub fn has_environment(&self) -> bool {
        self.environment.is_some()
    }

    pub fn take_environment(&mut self) -> Option<Arc<EnvironmentMap>> {
        self.environment.take()
    }

    /// Applies the same rotation to background and lighting
    pub fn set_rotation_degrees(&mut self, degrees: f32) {
        let radians = degrees.to_radians();
        self.background_rotation = radians;
        self.environment_rotation = radians;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animate_phase_shift() {
        let mut scene = Scene::new(&ViewerConfig::default());
        let phase = std::f32::consts::FRAC_PI_2;
        scene.animate(0.0, 0.2, phase);
        assert!(scene.object(Side::Left).vertical_offset.abs() < 1e-6);
        assert!((scene.object(Side::Right).vertical_offset - 0.2).abs() < 1e-6);

        let t = 1.234;
        scene.animate(t, 0.2, phase);
        assert!((scene.object(Side::Left).vertical_offset - 0.2 * t.sin()).abs() < 1e-6);
        assert!((scene.object(Side::Right).vertical_offset - 0.2 * (t + phase).sin()).abs() < 1e-6);
    }

    #[test]
    fn test_environment_installed_once() {
        let mut scene = Scene::new(&ViewerConfig::default());
        let first = Arc::new(EnvironmentMap::solid(4, 2, [1.0, 0.0, 0.0]));
        let second = Arc::new(EnvironmentMap::solid(4, 2, [0.0, 1.0, 0.0]));
        assert!(scene.set_environment(first.clone()));
        assert!(!scene.set_environment(second));
        assert!(Arc::ptr_eq(scene.environment().unwrap(), &first));
    }

    #[test]
    fn test_rotation_applies_to_background_and_lighting() {
        let mut scene = Scene::new(&ViewerConfig::default());
        scene.set_rotation_degrees(90.0);
        assert!((scene.background_rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(scene.background_rotation, scene.environment_rotation);
    }
}
