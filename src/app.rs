//! eframe application hosting the viewport session
//!
//! Owns the wgpu scene renderer and drives one render loop step per egui frame.

use crate::config::ViewerConfig;
use crate::constants;
use crate::environment::HttpSource;
use crate::gpu::{GraphicsConfig, SceneRenderer, ViewportRenderCallback};
use crate::session::ViewportSession;
use eframe::egui;
use log::{error, info, warn};
use std::sync::{Arc, Mutex};

/// Main application state
pub struct PreviewApp {
    session: ViewportSession,
    renderer: Option<Arc<Mutex<SceneRenderer>>>,
}

impl PreviewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let renderer = match cc.wgpu_render_state.as_ref() {
            Some(render_state) => {
                let graphics = GraphicsConfig::for_target(render_state.target_format);
                let renderer = SceneRenderer::new(&render_state.device, graphics);
                Some(Arc::new(Mutex::new(renderer)))
            }
            None => {
                warn!("No wgpu render state available; the viewport will stay blank");
                None
            }
        };

        let [width, height] = constants::window::DEFAULT_SIZE;
        let url = config.environment_url.clone();
        let mut session = ViewportSession::mount(config, width, height, cc.egui_ctx.pixels_per_point());
        session.request_environment(HttpSource::new(url));

        Self { session, renderer }
    }

    /// Tears down the session and the GPU resources behind it. Safe to call twice.
    pub fn shutdown(&mut self) {
        let Some(report) = self.session.teardown() else {
            return;
        };

        if let Some(renderer) = self.renderer.take() {
            match renderer.lock() {
                Ok(mut renderer) => {
                    let texture_released = renderer.release();
                    info!(
                        "Released renderer (environment texture: {}, scene environment: {})",
                        texture_released, report.environment_released
                    );
                }
                Err(e) => error!("PreviewApp::shutdown - Failed to lock renderer: {:?}", e),
            }
        }
    }

    pub fn session(&self) -> &ViewportSession {
        &self.session
    }

    fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size().max(egui::vec2(1.0, 1.0));
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());
        let pixels_per_point = ui.ctx().pixels_per_point();

        self.session.resize(rect.width(), rect.height(), pixels_per_point);

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.session.orbit(delta.x, delta.y);
        } else if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.session.pan(delta.x, delta.y);
        }

        if response.hovered() {
            let scroll = ui.ctx().input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.session.zoom(scroll / constants::controls::SCROLL_NOTCH);
            }
        }

        let Some(frame) = self.session.step() else {
            return;
        };
        if let Some(renderer) = &self.renderer {
            let callback = ViewportRenderCallback::new(Arc::clone(renderer), frame);
            ui.painter().add(callback.into_paint_callback(rect));
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
            return;
        }
        if !self.session.is_live() {
            return;
        }

        self.session.poll_environment();
        self.session.show_panel(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.show_viewport(ui));

        // Continuous animation
        ctx.request_repaint();
    }
}

impl Drop for PreviewApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
