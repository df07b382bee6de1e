//! GPU rendering module
//!
//! - [`config`] - Shared texture formats and pipeline state
//! - [`renderer`] - Offscreen HDR scene pass and tone-mapped present
//! - [`callback`] - egui paint callback integration
//! - `shaders/` - WGSL shader files for the scene and present passes

pub mod callback;
pub mod config;
pub mod renderer;

pub use callback::ViewportRenderCallback;
pub use config::GraphicsConfig;
pub use renderer::{FrameUniforms, ObjectUniforms, PresentUniforms, SceneRenderer};
