//! Renderable spheres

use super::Material;
use glam::{Mat4, Vec3};

/// Which of the two spheres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "Left sphere",
            Side::Right => "Right sphere",
        }
    }

    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Vertical offset of an object at `elapsed` seconds.
///
/// Always within `[-amplitude, amplitude]`.
pub fn bob_offset(elapsed: f32, amplitude: f32, phase: f32) -> f32 {
    amplitude * (elapsed + phase).sin()
}

/// A sphere with its material and animated placement
#[derive(Debug, Clone)]
pub struct Renderable {
    pub side: Side,
    pub radius: f32,
    /// Rest position; the bob is added on top of `base_position.y`
    pub base_position: Vec3,
    pub vertical_offset: f32,
    pub material: Material,
}

impl Renderable {
    pub fn new(side: Side, offset_x: f32, radius: f32, material: Material) -> Self {
        Self {
            side,
            radius,
            base_position: Vec3::new(side.sign() * offset_x, 0.0, 0.0),
            vertical_offset: 0.0,
            material,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.base_position + Vec3::Y * self.vertical_offset
    }

    /// Model matrix for a unit sphere mesh
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.radius),
            glam::Quat::IDENTITY,
            self.position(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bob_stays_within_amplitude() {
        let amplitude = 0.2;
        for step in 0..2000 {
            let t = step as f32 * 0.037;
            for phase in [0.0, std::f32::consts::FRAC_PI_2] {
                let y = bob_offset(t, amplitude, phase);
                assert!(y.abs() <= amplitude + 1e-6, "t={t} y={y}");
            }
        }
    }

    #[test]
    fn test_objects_are_symmetric() {
        let left = Renderable::new(Side::Left, 1.5, 1.0, Material::default());
        let right = Renderable::new(Side::Right, 1.5, 1.0, Material::default());
        assert_eq!(left.position(), Vec3::new(-1.5, 0.0, 0.0));
        assert_eq!(right.position(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_model_matrix_includes_offset() {
        let mut object = Renderable::new(Side::Right, 1.5, 2.0, Material::default());
        object.vertical_offset = 0.1;
        let top = object.model_matrix().transform_point3(Vec3::Y);
        assert!((top - Vec3::new(1.5, 2.1, 0.0)).length() < 1e-5);
    }
}
