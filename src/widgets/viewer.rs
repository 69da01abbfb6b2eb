//! Central preview pane.
//!
//! Uploads the document's preview bitmap as an egui texture, keyed on the
//! document revision: any wholesale replacement (new file, visibility
//! toggle, recomposite) invalidates the texture and triggers one decode +
//! upload. The image is drawn fit-to-pane, never upscaled past 1:1 of the
//! preview raster.

use eframe::egui;

use crate::entities::{PsdDocument, Surface};
use log::warn;

/// Texture cache and view parameters for the preview pane
#[derive(Default)]
pub struct ViewerState {
    texture: Option<egui::TextureHandle>,
    /// Revision of the document the texture was built from
    texture_revision: Option<u64>,
    /// Effective zoom (displayed px / document px), for the status bar
    pub zoom: f32,
}

impl ViewerState {
    /// Drop the cached texture (new document incoming)
    pub fn reset(&mut self) {
        self.texture = None;
        self.texture_revision = None;
        self.zoom = 0.0;
    }

    fn sync_texture(&mut self, ctx: &egui::Context, doc: &PsdDocument) {
        if self.texture_revision == Some(doc.revision) {
            return;
        }
        self.texture_revision = Some(doc.revision);
        self.texture = None;

        let Some(uri) = doc.preview.as_deref() else {
            return;
        };
        match Surface::from_png_data_uri(uri) {
            Ok(surface) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [surface.width() as usize, surface.height() as usize],
                    surface.pixels(),
                );
                self.texture = Some(ctx.load_texture(
                    "document_preview",
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => {
                warn!("Preview upload failed: {}", e);
            }
        }
    }
}

/// Render the preview pane.
pub fn render(
    ui: &mut egui::Ui,
    state: &mut ViewerState,
    doc: Option<&PsdDocument>,
    loading: bool,
    error: Option<&str>,
) {
    if loading {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.4);
                ui.spinner();
                ui.label("Parsing document...");
            });
        });
        return;
    }

    if let Some(message) = error {
        ui.centered_and_justified(|ui| {
            ui.colored_label(ui.visuals().error_fg_color, message);
        });
        return;
    }

    let Some(doc) = doc else {
        ui.centered_and_justified(|ui| {
            ui.colored_label(
                ui.visuals().weak_text_color(),
                "Drop a PSD/PSB file here, or use Open",
            );
        });
        return;
    };

    state.sync_texture(ui.ctx(), doc);

    let Some(texture) = &state.texture else {
        ui.centered_and_justified(|ui| {
            ui.colored_label(ui.visuals().weak_text_color(), "No preview available");
        });
        return;
    };

    let tex_size = texture.size_vec2();
    let available = ui.available_size();
    let scale = (available.x / tex_size.x)
        .min(available.y / tex_size.y)
        .min(1.0)
        .max(0.0);
    let display = tex_size * scale;

    // Zoom relative to the original document, not the bounded preview
    state.zoom = if doc.width > 0 {
        display.x / doc.width as f32
    } else {
        0.0
    };

    ui.centered_and_justified(|ui| {
        ui.image((texture.id(), display));
    });
}
