//! Document and selected-layer info panel (desktop layout only).

use eframe::egui;

use crate::entities::{Layer, PsdDocument};
use crate::layout::DeviceClass;
use crate::utils;
use crate::widgets::layer_tree::kind_badge;

/// Render document metadata and selected-layer details.
pub fn render(
    ui: &mut egui::Ui,
    doc: Option<&PsdDocument>,
    selected: Option<&Layer>,
    device: DeviceClass,
) {
    ui.heading("Info");
    ui.separator();

    let Some(doc) = doc else {
        ui.colored_label(ui.visuals().weak_text_color(), "No document loaded");
        return;
    };

    egui::Grid::new("doc_info")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.weak("Name");
            ui.label(&doc.name);
            ui.end_row();

            ui.weak("Dimensions");
            ui.label(format!("{} x {} px", doc.width, doc.height));
            ui.end_row();

            ui.weak("Resolution");
            ui.label(format!("{:.0} dpi", doc.resolution));
            ui.end_row();

            ui.weak("Color mode");
            ui.label(format!("{} ({} ch)", doc.color_mode, doc.channels));
            ui.end_row();

            ui.weak("File size");
            ui.label(utils::format_bytes(doc.file_size));
            ui.end_row();

            let counts = doc.layer_counts();
            ui.weak("Layers");
            ui.label(format!(
                "{} total, {} visible, {} hidden",
                counts.total, counts.visible, counts.hidden
            ));
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.separator();

    let Some(layer) = selected else {
        ui.colored_label(ui.visuals().weak_text_color(), "No layer selected");
        return;
    };

    let (icon, color) = kind_badge(layer.kind);
    ui.horizontal(|ui| {
        ui.colored_label(color, icon);
        ui.strong(&layer.name);
    });

    egui::Grid::new("layer_info")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.weak("Kind");
            ui.label(layer.kind.label());
            ui.end_row();

            ui.weak("Visible");
            ui.label(if layer.visible { "yes" } else { "no" });
            ui.end_row();

            ui.weak("Opacity");
            ui.label(format!("{}%", layer.opacity_percent()));
            ui.end_row();

            ui.weak("Position");
            ui.label(format!("({}, {})", layer.bounds.left, layer.bounds.top));
            ui.end_row();

            ui.weak("Size");
            ui.label(format!("{} x {} px", layer.bounds.width, layer.bounds.height));
            ui.end_row();
        });

    if layer.is_group() {
        ui.add_space(8.0);
        ui.weak(format!("{} children", layer.children.len()));
        egui::Grid::new("group_children")
            .num_columns(device.grid_columns())
            .spacing([8.0, 2.0])
            .show(ui, |ui| {
                for (index, child) in layer.children.iter().enumerate() {
                    ui.label(&child.name);
                    if (index + 1) % device.grid_columns() == 0 {
                        ui.end_row();
                    }
                }
            });
    }
}
