//! Sphere preview library
//!
//! Interactive preview of two reflective spheres lit by a remote HDR environment.

pub mod app;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod gpu;
pub mod panel;
pub mod scene;
pub mod session;
pub mod viewport;

pub use app::PreviewApp;
pub use config::ViewerConfig;
pub use error::LoadError;
pub use session::{FrameState, SessionState, TeardownReport, ViewportSession};
