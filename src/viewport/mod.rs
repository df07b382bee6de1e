//! Camera, input controller and render surface of the preview viewport

pub mod camera;
pub mod controls;
pub mod surface;

pub use camera::Camera3D;
pub use controls::OrbitControls;
pub use surface::{RenderSurface, ToneMapping};
