//! Bottom status bar: file, dimensions, color mode, counts, zoom.

use eframe::egui;

use crate::entities::PsdDocument;

/// Status bar component
#[derive(Default)]
pub struct StatusBar {
    pub current_message: String,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render status bar at bottom of screen
    pub fn render(
        &self,
        ctx: &egui::Context,
        doc: Option<&PsdDocument>,
        zoom: f32,
        error: Option<&str>,
    ) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Filename
                if let Some(doc) = doc {
                    ui.monospace(&doc.name);
                } else {
                    ui.monospace("No file");
                }

                ui.separator();

                // Resolution
                if let Some(doc) = doc {
                    ui.monospace(format!("{:>5}x{:<5}", doc.width, doc.height));
                } else {
                    ui.monospace("    0x0    ");
                }

                ui.separator();

                // Color mode
                if let Some(doc) = doc {
                    ui.monospace(&doc.color_mode);
                } else {
                    ui.monospace("---");
                }

                ui.separator();

                // Layer counts
                if let Some(doc) = doc {
                    let counts = doc.layer_counts();
                    ui.monospace(format!(
                        "{} layers ({} hidden)",
                        counts.total, counts.hidden
                    ));
                } else {
                    ui.monospace("0 layers");
                }

                ui.separator();

                // Zoom
                ui.monospace(format!("{:>6.1}%", zoom * 100.0));

                // Error takes precedence over the transient message
                if let Some(error) = error {
                    ui.separator();
                    ui.colored_label(ui.visuals().error_fg_color, error);
                } else if !self.current_message.is_empty() {
                    ui.separator();
                    ui.monospace(&self.current_message);
                }
            });
        });
    }
}
