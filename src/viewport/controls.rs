//! Damped orbit controller
//!
//! Input accumulates a pending motion; every [`OrbitControls::update`] applies
//! `damping_factor` of what is pending and keeps the rest, so the camera eases out
//! exponentially after the pointer is released. Zoom is applied in the next update.

use super::Camera3D;
use crate::constants;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const PHI_EPSILON: f32 = 1e-6;
const MOTION_EPSILON: f32 = 1e-6;

/// Radius, polar angle from +Y, azimuth around +Y from +Z
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self { radius, phi: 0.0, theta: 0.0 };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit/zoom/pan around a target point
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            damping_factor: constants::controls::DAMPING_FACTOR,
            rotate_speed: constants::controls::ROTATE_SPEED,
            zoom_speed: constants::controls::ZOOM_SPEED,
            pan_speed: constants::controls::PAN_SPEED,
            min_distance: constants::controls::MIN_DISTANCE,
            max_distance: constants::controls::MAX_DISTANCE,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Queues a rotation, radians. Positive `theta` swings the camera to the left.
    pub fn rotate_by(&mut self, theta: f32, phi: f32) {
        self.pending_theta -= theta;
        self.pending_phi -= phi;
    }

    /// Queues a rotation from a pointer drag. A drag across the full viewport height is
    /// one full turn.
    pub fn rotate_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate_by(
            TAU * dx / height * self.rotate_speed,
            TAU * dy / height * self.rotate_speed,
        );
    }

    /// Queues a dolly. Positive `notches` move the camera closer.
    pub fn zoom(&mut self, notches: f32) {
        self.scale *= 0.95_f32.powf(self.zoom_speed * notches);
    }

    /// Queues a pan from a pointer drag so that the point under the cursor follows it
    pub fn pan_pixels(&mut self, dx: f32, dy: f32, camera: &Camera3D, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let target_distance = (camera.position - self.target).length() * (camera.fov / 2.0).tan();
        let (right, up) = camera.screen_axes();

        let left = 2.0 * dx * target_distance / height * self.pan_speed;
        let upward = 2.0 * dy * target_distance / height * self.pan_speed;

        self.pending_pan -= right * left;
        self.pending_pan += up * upward;
    }

    /// Whether any motion is still easing out
    pub fn is_settling(&self) -> bool {
        self.pending_theta.abs() > MOTION_EPSILON
            || self.pending_phi.abs() > MOTION_EPSILON
            || self.pending_pan.length() > MOTION_EPSILON
            || (self.scale - 1.0).abs() > MOTION_EPSILON
    }

    /// Advances the damped state and moves `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera3D) -> bool {
        let before = camera.position;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        spherical.theta += self.pending_theta * self.damping_factor;
        spherical.phi += self.pending_phi * self.damping_factor;
        spherical.phi = spherical.phi.clamp(PHI_EPSILON, PI - PHI_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pending_pan * self.damping_factor;

        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        let keep = 1.0 - self.damping_factor;
        self.pending_theta *= keep;
        self.pending_phi *= keep;
        self.pending_pan *= keep;
        self.scale = 1.0;

        (camera.position - before).length() > MOTION_EPSILON
    }
}
