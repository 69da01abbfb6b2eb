//! Layer tree panel: one row per node, visibility toggle and selection.
//!
//! Rows follow the document's structural order (bottom-most layer first),
//! indented by nesting depth. State changes are reported back as actions;
//! the panel never mutates the store itself.

use eframe::egui;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Layer, LayerKind, PsdDocument};

/// Row interactions, applied by the app after rendering
#[derive(Debug, Clone, Copy)]
pub enum LayerTreeAction {
    Select(Uuid),
    ToggleVisibility(Uuid),
}

/// Render the layer tree panel; returns the interactions of this frame.
pub fn render(
    ui: &mut egui::Ui,
    doc: Option<&PsdDocument>,
    selected: Option<Uuid>,
) -> Vec<LayerTreeAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.heading("Layers");
        if let Some(doc) = doc {
            let counts = doc.layer_counts();
            ui.weak(format!("{} ({} hidden)", counts.total, counts.hidden));
        }
    });
    ui.separator();

    let Some(doc) = doc else {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.colored_label(ui.visuals().weak_text_color(), "No document loaded");
            ui.colored_label(
                ui.visuals().weak_text_color(),
                "Open a PSD file or drop it here",
            );
        });
        return actions;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            render_layers(ui, &doc.layers, 0, selected, &mut actions);
        });

    actions
}

fn render_layers(
    ui: &mut egui::Ui,
    layers: &[Arc<Layer>],
    depth: usize,
    selected: Option<Uuid>,
    actions: &mut Vec<LayerTreeAction>,
) {
    for layer in layers {
        ui.horizontal(|ui| {
            ui.add_space(depth as f32 * 14.0);

            let eye = if layer.visible { "●" } else { "○" };
            if ui
                .small_button(eye)
                .on_hover_text("Toggle visibility")
                .clicked()
            {
                actions.push(LayerTreeAction::ToggleVisibility(layer.id));
            }

            let (icon, icon_color) = kind_badge(layer.kind);
            ui.colored_label(icon_color, icon);

            let mut name = egui::RichText::new(&layer.name);
            if !layer.visible {
                name = name.weak();
            }
            let is_selected = selected == Some(layer.id);
            if ui.selectable_label(is_selected, name).clicked() {
                actions.push(LayerTreeAction::Select(layer.id));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(format!("{}%", layer.opacity_percent()));
            });
        });

        if !layer.children.is_empty() {
            render_layers(ui, &layer.children, depth + 1, selected, actions);
        }
    }
}

/// Icon and color per node type (same scheme for tree and info panel)
pub fn kind_badge(kind: LayerKind) -> (&'static str, egui::Color32) {
    match kind {
        LayerKind::Group => ("[G]", egui::Color32::from_rgb(100, 150, 255)),
        LayerKind::Text => ("[T]", egui::Color32::from_rgb(200, 150, 255)),
        LayerKind::Effect => ("[E]", egui::Color32::from_rgb(255, 200, 100)),
        LayerKind::Masked => ("[M]", egui::Color32::from_rgb(180, 180, 180)),
        LayerKind::Shape => ("[S]", egui::Color32::from_rgb(100, 220, 220)),
        LayerKind::Image => ("[I]", egui::Color32::from_rgb(100, 180, 100)),
        LayerKind::Normal => ("[N]", egui::Color32::from_rgb(160, 160, 160)),
    }
}
