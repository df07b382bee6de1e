//! Parameter panel
//!
//! Overlay window with the live controls. Like the node parameter interfaces it draws
//! from a snapshot of the current values and returns the edits as
//! [`ParameterChange`]s for the session to apply.

use crate::constants;
use crate::scene::{Material, Side};
use egui::{Context, Ui};
use log::debug;

/// One edit made in the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterChange {
    Metalness { side: Side, value: f32 },
    Roughness { side: Side, value: f32 },
    Color { side: Side, rgb: [f32; 3] },
    /// Tone mapping exposure, 0..=2
    Exposure(f32),
    /// Background and lighting rotation, 0..=360 degrees
    EnvironmentRotation { degrees: f32 },
}

/// Values the panel displays
#[derive(Debug, Clone, PartialEq)]
pub struct PanelValues {
    pub materials: [Material; 2],
    pub exposure: f32,
    pub rotation_degrees: f32,
    pub loading: bool,
}

/// Parameter panel renderer
pub struct ParameterPanel {
    title: String,
    default_width: f32,
    dismantled: bool,
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self {
            title: "Parameters".to_string(),
            default_width: constants::panel::DEFAULT_WIDTH,
            dismantled: false,
        }
    }

    /// Shows the panel as a window anchored to the top right corner
    pub fn show(&mut self, ctx: &Context, values: &PanelValues) -> Vec<ParameterChange> {
        if self.dismantled {
            return Vec::new();
        }

        let mut changes = Vec::new();
        egui::Window::new(self.title.as_str())
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .default_width(self.default_width)
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                changes = Self::build_interface(ui, values);
            });

        for change in &changes {
            debug!("Parameter changed: {:?}", change);
        }
        changes
    }

    /// Renders the controls and returns what the user changed this frame
    pub fn build_interface(ui: &mut Ui, values: &PanelValues) -> Vec<ParameterChange> {
        let mut changes = Vec::new();

        if values.loading {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading environment…");
            });
            ui.separator();
        }

        for side in Side::ALL {
            let material = values.materials[side.index()];
            egui::CollapsingHeader::new(side.label())
                .default_open(true)
                .show(ui, |ui| {
                    let mut metalness = material.metalness;
                    if ui
                        .add(egui::Slider::new(&mut metalness, constants::panel::UNIT_RANGE).text("Metalness"))
                        .changed()
                    {
                        changes.push(ParameterChange::Metalness { side, value: metalness });
                    }

                    let mut roughness = material.roughness;
                    if ui
                        .add(egui::Slider::new(&mut roughness, constants::panel::UNIT_RANGE).text("Roughness"))
                        .changed()
                    {
                        changes.push(ParameterChange::Roughness { side, value: roughness });
                    }

                    ui.horizontal(|ui| {
                        let mut rgb = material.color;
                        if ui.color_edit_button_rgb(&mut rgb).changed() {
                            changes.push(ParameterChange::Color { side, rgb });
                        }
                        ui.label("Color");
                    });
                });
        }

        ui.separator();
        ui.label("Environment");

        let mut exposure = values.exposure;
        if ui
            .add(egui::Slider::new(&mut exposure, constants::surface::EXPOSURE_RANGE).text("Brightness"))
            .changed()
        {
            changes.push(ParameterChange::Exposure(exposure));
        }

        let mut degrees = values.rotation_degrees;
        if ui
            .add(
                egui::Slider::new(&mut degrees, constants::panel::ROTATION_RANGE_DEGREES)
                    .text("Rotation")
                    .suffix("°"),
            )
            .changed()
        {
            changes.push(ParameterChange::EnvironmentRotation { degrees });
        }

        changes
    }

    /// Removes the panel for good
    pub fn dismantle(&mut self) {
        self.dismantled = true;
    }

    pub fn is_dismantled(&self) -> bool {
        self.dismantled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> PanelValues {
        PanelValues {
            materials: [Material::chrome(), Material::gold()],
            exposure: 1.0,
            rotation_degrees: 0.0,
            loading: true,
        }
    }

    #[test]
    fn test_untouched_panel_reports_no_changes() {
        let ctx = Context::default();
        let mut panel = ParameterPanel::new();
        let mut changes = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changes = panel.show(ctx, &values());
        });
        assert!(changes.is_empty());
    }

    #[test]
    fn test_dismantled_panel_draws_nothing() {
        let ctx = Context::default();
        let mut panel = ParameterPanel::new();
        panel.dismantle();
        assert!(panel.is_dismantled());
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            assert!(panel.show(ctx, &values()).is_empty());
        });
        assert!(output.shapes.is_empty());
    }
}
