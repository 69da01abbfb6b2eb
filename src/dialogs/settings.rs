//! Settings window with category tree.

use eframe::egui;
use egui_ltreeview::TreeView;
use std::path::PathBuf;

use crate::theme::ThemeMode;

/// Settings categories
#[derive(Debug, Clone, Copy, PartialEq)]
enum SettingsCategory {
    General,
    Appearance,
}

impl SettingsCategory {
    fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::General => "General",
            SettingsCategory::Appearance => "Appearance",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "General" => Some(SettingsCategory::General),
            "Appearance" => Some(SettingsCategory::Appearance),
            _ => None,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AppSettings {
    // Appearance
    pub theme: ThemeMode,
    pub font_size: f32,

    // Panels (startup defaults; runtime toggles live on the app)
    pub show_layer_panel: bool,
    pub show_info_panel: bool,

    // Session
    pub reopen_last_file: bool,
    pub last_file: Option<PathBuf>,

    // Internal
    pub selected_settings_category: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Auto,
            font_size: 14.0,
            show_layer_panel: true,
            show_info_panel: true,
            reopen_last_file: false,
            last_file: None,
            selected_settings_category: None,
        }
    }
}

/// Render the settings window (when `show_settings` is true).
pub fn render_settings_window(
    ctx: &egui::Context,
    show_settings: &mut bool,
    settings: &mut AppSettings,
) {
    // Get selected category from settings or use default
    let mut selected = settings
        .selected_settings_category
        .as_ref()
        .and_then(|s| SettingsCategory::from_str(s))
        .unwrap_or(SettingsCategory::General);

    egui::Window::new("Settings")
        .id(egui::Id::new("settings_window"))
        .open(show_settings)
        .default_size([460.0, 320.0])
        .min_size([380.0, 260.0])
        .resizable(true)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Left panel: TreeView (140px fixed width)
                ui.vertical(|ui| {
                    ui.set_width(140.0);
                    ui.add_space(4.0);

                    let tree_id = ui.make_persistent_id("settings_tree_view");
                    let (_response, actions) = TreeView::new(tree_id).show(ui, |builder| {
                        builder.leaf(0, SettingsCategory::General.as_str());
                        builder.leaf(1, SettingsCategory::Appearance.as_str());
                    });

                    // Handle selection from actions
                    for action in actions {
                        if let egui_ltreeview::Action::SetSelected(node_ids) = action {
                            if let Some(&node_id) = node_ids.first() {
                                selected = match node_id {
                                    0 => SettingsCategory::General,
                                    1 => SettingsCategory::Appearance,
                                    _ => selected,
                                };
                            }
                        }
                    }
                });

                ui.separator();

                // Right panel: content for selected category
                ui.vertical(|ui| {
                    ui.add_space(8.0);

                    match selected {
                        SettingsCategory::General => render_general_settings(ui, settings),
                        SettingsCategory::Appearance => render_appearance_settings(ui, settings),
                    }
                });
            });
        });

    // Save selected category
    settings.selected_settings_category = Some(selected.as_str().to_string());
}

fn render_general_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.strong("Startup");
    ui.checkbox(&mut settings.show_layer_panel, "Show layer panel");
    ui.checkbox(&mut settings.show_info_panel, "Show info panel");
    ui.checkbox(&mut settings.reopen_last_file, "Reopen last file");

    if let Some(last) = &settings.last_file {
        ui.add_space(4.0);
        ui.weak(format!("Last file: {}", last.display()));
    }
}

fn render_appearance_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.strong("Theme");
    for mode in [ThemeMode::Light, ThemeMode::Dark, ThemeMode::Auto] {
        ui.radio_value(&mut settings.theme, mode, mode.label());
    }

    ui.add_space(8.0);
    ui.strong("Text");
    ui.add(egui::Slider::new(&mut settings.font_size, 10.0..=22.0).text("Font size"));
}
