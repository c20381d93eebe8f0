use std::ops::RangeInclusive;

use log::warn;

use crate::math::Color;
use crate::scene::Scene;

use super::{ColorBinding, ControlBinding, ControlError, DegreesBinding, ScalarBinding};

enum Control {
    Color {
        label: String,
        binding: ColorBinding,
        /// Text field contents; follows the scene while the field is not focused
        hex: String,
    },
    Degrees {
        label: String,
        binding: DegreesBinding,
        range: RangeInclusive<f32>,
    },
    Scalar {
        label: String,
        binding: ScalarBinding,
        range: RangeInclusive<f32>,
    },
}

/// egui window of labelled bindings
pub struct ControlPanel {
    title: String,
    controls: Vec<Control>,
    last_error: Option<String>,
}

impl ControlPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            controls: Vec::new(),
            last_error: None,
        }
    }

    pub fn add_color(&mut self, label: impl Into<String>, binding: ColorBinding) -> &mut Self {
        self.controls.push(Control::Color {
            label: label.into(),
            binding,
            hex: String::new(),
        });
        self
    }

    pub fn add_degrees(
        &mut self,
        label: impl Into<String>,
        binding: DegreesBinding,
        range: RangeInclusive<f32>,
    ) -> &mut Self {
        self.controls.push(Control::Degrees {
            label: label.into(),
            binding,
            range,
        });
        self
    }

    pub fn add_scalar(
        &mut self,
        label: impl Into<String>,
        binding: ScalarBinding,
        range: RangeInclusive<f32>,
    ) -> &mut Self {
        self.controls.push(Control::Scalar {
            label: label.into(),
            binding,
            range,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Draw the panel and write any edits straight into `scene`
    pub fn show(&mut self, ctx: &egui::Context, scene: &mut Scene) {
        let controls = &mut self.controls;
        let mut edited = false;
        let mut failure = None;

        egui::Window::new(self.title.as_str())
            .default_pos(egui::pos2(10.0, 90.0))
            .resizable(false)
            .show(ctx, |ui| {
                for control in controls.iter_mut() {
                    match control.ui(ui, scene) {
                        Ok(changed) => edited |= changed,
                        Err(err) => failure = Some(err),
                    }
                }
            });

        self.record_outcome(edited, failure);
        if let Some(message) = &self.last_error {
            egui::TopBottomPanel::bottom("control_errors").show(ctx, |ui| {
                ui.colored_label(egui::Color32::LIGHT_RED, message.as_str());
            });
        }
    }

    /// A rejected edit is shown until some later edit goes through
    fn record_outcome(&mut self, edited: bool, failure: Option<ControlError>) {
        match failure {
            Some(err) => {
                warn!("Control edit rejected: {}", err);
                self.last_error = Some(err.to_string());
            }
            None if edited => self.last_error = None,
            None => {}
        }
    }
}

impl Control {
    /// Returns whether the scene was edited this frame
    fn ui(&mut self, ui: &mut egui::Ui, scene: &mut Scene) -> Result<bool, ControlError> {
        match self {
            Control::Color {
                label,
                binding,
                hex,
            } => {
                let mut rgb = binding.color(scene)?.to_rgb8();
                ui.horizontal(|ui| -> Result<bool, ControlError> {
                    ui.label(label.as_str());
                    let mut result = Ok(false);
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        result = binding.set_color(scene, Color::from_rgb8(rgb)).map(|_| true);
                    }
                    let field = ui.add(egui::TextEdit::singleline(hex).desired_width(70.0));
                    if field.lost_focus() {
                        result = binding.set(scene, hex.clone()).map(|_| true);
                    }
                    if !field.has_focus() {
                        *hex = binding.get(scene)?;
                    }
                    result
                })
                .inner
            }
            Control::Degrees {
                label,
                binding,
                range,
            } => {
                let mut degrees = binding.get(scene)?;
                let slider = egui::Slider::new(&mut degrees, range.clone())
                    .text(label.as_str())
                    .suffix("°");
                let changed = ui.add(slider).changed();
                if changed {
                    binding.set(scene, degrees)?;
                }
                Ok(changed)
            }
            Control::Scalar {
                label,
                binding,
                range,
            } => {
                let mut value = binding.get(scene)?;
                let slider = egui::Slider::new(&mut value, range.clone()).text(label.as_str());
                let changed = ui.add(slider).changed();
                if changed {
                    binding.set(scene, value)?;
                }
                Ok(changed)
            }
        }
    }
}

/// Corner overlay: frame rate, object count, loads still in flight
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Hud {
    pub fps: f32,
    pub objects: usize,
    pub pending_loads: usize,
}

impl Hud {
    pub fn show(&self, ctx: &egui::Context) {
        egui::Window::new("HUD")
            .title_bar(false)
            .resizable(false)
            .fixed_pos(egui::pos2(10.0, 10.0))
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("{:.0}", self.fps))
                        .size(48.0)
                        .color(egui::Color32::from_rgb(74, 158, 255)),
                );
                ui.label(
                    egui::RichText::new(format!("FPS · {} objects", self.objects))
                        .size(12.0)
                        .color(egui::Color32::GRAY),
                );
                if self.pending_loads > 0 {
                    ui.label(
                        egui::RichText::new(format!("loading {} assets", self.pending_loads))
                            .size(12.0)
                            .color(egui::Color32::GRAY),
                    );
                }
            });
    }
}
