//! Sphere preview - two reflective spheres under image-based lighting
//!
//! Drag to orbit, right-drag to pan, scroll to zoom.

use eframe::egui;
use sphere_preview::{constants, PreviewApp, ViewerConfig};

/// Application entry point
fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(constants::window::DEFAULT_SIZE)
            .with_min_inner_size(constants::window::MIN_SIZE)
            .with_app_id("sphere-preview")
            .with_title("Sphere Preview"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Sphere Preview",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(PreviewApp::new(cc, ViewerConfig::default())))
        }),
    )
}
