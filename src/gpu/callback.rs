//! Paint callback that hands a frame snapshot to the shared scene renderer
//!
//! The renderer lives behind `Arc<Mutex<..>>` so the UI thread can release it on
//! teardown while egui-wgpu still holds callbacks from the last submitted frame.

use super::renderer::SceneRenderer;
use crate::session::FrameState;
use egui_wgpu::CallbackTrait;
use log::error;
use std::sync::{Arc, Mutex};

/// Viewport callback carrying one frame of scene state
pub struct ViewportRenderCallback {
    renderer: Arc<Mutex<SceneRenderer>>,
    frame: FrameState,
}

impl ViewportRenderCallback {
    pub fn new(renderer: Arc<Mutex<SceneRenderer>>, frame: FrameState) -> Self {
        Self { renderer, frame }
    }

    /// Wrap into an egui paint callback covering `rect`
    pub fn into_paint_callback(self, rect: egui::Rect) -> egui::PaintCallback {
        egui_wgpu::Callback::new_paint_callback(rect, self)
    }
}

impl CallbackTrait for ViewportRenderCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        egui_encoder: &mut wgpu::CommandEncoder,
        _callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        match self.renderer.lock() {
            Ok(mut renderer) if !renderer.is_released() => {
                renderer.prepare(device, queue, egui_encoder, &self.frame)
            }
            Ok(_) => {}
            Err(e) => error!("ViewportRenderCallback::prepare - Failed to lock renderer: {:?}", e),
        }
        Vec::new()
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        _callback_resources: &egui_wgpu::CallbackResources,
    ) {
        match self.renderer.lock() {
            Ok(renderer) if !renderer.is_released() => renderer.paint(render_pass),
            Ok(_) => {}
            Err(e) => error!("ViewportRenderCallback::paint - Failed to lock renderer: {:?}", e),
        }
    }
}
