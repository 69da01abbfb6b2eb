use psdview::cli::Args;
use psdview::config;
use psdview::dialogs::{AppSettings, render_settings_window};
use psdview::layout::DeviceClass;
use psdview::loader::Loader;
use psdview::parser;
use psdview::store::DocumentStore;
use psdview::theme;
use psdview::widgets::layer_tree::{self, LayerTreeAction};
use psdview::widgets::{StatusBar, ViewerState, file_dialogs, info_panel, viewer};

use clap::Parser;
use eframe::egui;
use log::{debug, info};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main application state
#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct PsdViewerApp {
    settings: AppSettings,
    #[serde(skip)]
    store: DocumentStore,
    #[serde(skip)]
    loader: Loader,
    #[serde(skip)]
    viewer: ViewerState,
    #[serde(skip)]
    status_bar: StatusBar,
    #[serde(skip)]
    show_settings: bool,
    /// Runtime panel toggles, seeded from settings on first frame
    #[serde(skip)]
    show_layer_panel: bool,
    #[serde(skip)]
    show_info_panel: bool,
    /// Initial file handed over from the CLI (or reopen-last)
    #[serde(skip)]
    pending_file: Option<PathBuf>,
    #[serde(skip)]
    initialized: bool,
}

impl PsdViewerApp {
    /// Kick off a background load; the result lands via `Loader::poll`
    fn open_file(&mut self, path: PathBuf) {
        info!("Opening {}", path.display());
        let generation = self.store.begin_load();
        self.settings.last_file = Some(path.clone());
        self.loader.request(generation, path);
    }

    /// Apply this frame's layer-tree interactions to the store
    fn handle_tree_actions(&mut self, actions: Vec<LayerTreeAction>) {
        for action in actions {
            match action {
                LayerTreeAction::Select(id) => self.store.select_layer(id),
                LayerTreeAction::ToggleVisibility(id) => {
                    if self.store.toggle_layer_visibility(id) {
                        // The toggled tree already carries the new flags;
                        // recomposite with no extra overrides
                        let preview = self
                            .store
                            .current_file()
                            .and_then(|doc| parser::regenerate_preview(doc, &HashMap::new()));
                        self.store.set_preview(preview);
                    }
                }
            }
        }
    }

    fn seed_runtime_state(&mut self) {
        self.show_layer_panel = self.settings.show_layer_panel;
        self.show_info_panel = self.settings.show_info_panel;
        if let Some(path) = self.pending_file.take() {
            self.open_file(path);
        }
    }
}

impl eframe::App for PsdViewerApp {
    /// Main frame update - called every frame by eframe.
    ///
    /// Flow:
    /// 1. One-time runtime seeding (panel toggles, initial file)
    /// 2. Apply theme and font settings
    /// 3. Poll background loads
    /// 4. Handle dropped files
    /// 5. Render UI (toolbar, panels, viewer, status bar, dialogs)
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.initialized {
            self.initialized = true;
            self.seed_runtime_state();
        }

        // Apply theme based on settings (re-resolved every frame so Auto
        // tracks the OS live)
        theme::apply(self.settings.theme, ctx);

        // Apply font size from settings
        let mut style = (*ctx.style()).clone();
        for (_, font_id) in style.text_styles.iter_mut() {
            font_id.size = self.settings.font_size;
        }
        ctx.set_style(style);

        // Commit finished background loads; stale generations are dropped
        // by the store
        if let Some(result) = self.loader.poll() {
            let applied = self.store.finish_load(result.generation, result.result);
            if applied && self.store.error().is_none() {
                self.viewer.reset();
                self.status_bar.current_message = format!("Loaded {}", result.path.display());
            }
            ctx.request_repaint();
        }
        if self.store.is_loading() {
            // Keep the spinner animating
            ctx.request_repaint();
        }

        // Handle drag-and-drop files
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().next() {
            info!("File dropped: {}", path.display());
            self.open_file(path);
        }

        // Responsive layout follows the current window size
        let window_width = ctx.screen_rect().width();
        let device = DeviceClass::from_width(window_width);

        // Toolbar (top panel)
        egui::TopBottomPanel::top("toolbar")
            .exact_height(device.toolbar_height())
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    if ui.button("Open...").clicked() {
                        if let Some(path) =
                            file_dialogs::create_document_dialog("Open Photoshop Document")
                                .pick_file()
                        {
                            self.open_file(path);
                        }
                    }
                    if self.store.current_file().is_some() && ui.button("Close").clicked() {
                        self.store.clear_file();
                        self.viewer.reset();
                        self.status_bar.current_message.clear();
                    }
                    ui.separator();

                    if ui
                        .button(format!("Theme: {}", self.settings.theme.label()))
                        .on_hover_text("Cycle light / dark / auto")
                        .clicked()
                    {
                        self.settings.theme = self.settings.theme.cycled();
                    }
                    if ui.button("Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                    ui.separator();

                    ui.toggle_value(&mut self.show_layer_panel, "Layers");
                    if device.panel_width() > 0.0 {
                        ui.toggle_value(&mut self.show_info_panel, "Info");
                    }
                });
            });

        // Status bar (bottom panel)
        self.status_bar.render(
            ctx,
            self.store.current_file(),
            self.viewer.zoom,
            self.store.error(),
        );

        // Layer tree (left panel)
        if self.show_layer_panel {
            let width = device.sidebar_width(window_width).min(window_width * 0.9);
            egui::SidePanel::left("layer_panel")
                .exact_width(width)
                .resizable(false)
                .show(ctx, |ui| {
                    let actions = layer_tree::render(
                        ui,
                        self.store.current_file(),
                        self.store.selected_layer_id(),
                    );
                    self.handle_tree_actions(actions);
                });
        }

        // Info panel (right, desktop class only)
        if self.show_info_panel && device.panel_width() > 0.0 {
            egui::SidePanel::right("info_panel")
                .exact_width(device.panel_width())
                .resizable(false)
                .show(ctx, |ui| {
                    info_panel::render(
                        ui,
                        self.store.current_file(),
                        self.store.selected_layer(),
                        device,
                    );
                });
        }

        // Preview (central panel)
        egui::CentralPanel::default().show(ctx, |ui| {
            viewer::render(
                ui,
                &mut self.viewer,
                self.store.current_file(),
                self.store.is_loading(),
                self.store.error(),
            );
        });

        // Settings window
        render_settings_window(ctx, &mut self.show_settings, &mut self.settings);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = serde_json::to_string(self) {
            storage.set_string(eframe::APP_KEY, json);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Initialize logger based on --log flag
    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file("psdview.log", &path_config));

        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .init();
    }

    info!("psdview starting...");
    debug!("Command-line args: {:?}", args);
    info!(
        "Config path: {}",
        config::config_file("psdview.json", &path_config).display()
    );

    if let Some(ref path) = args.file_path {
        info!("Input file: {}", path.display());
    } else {
        info!("No input file provided, starting with empty state (drag-and-drop supported)");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("psdview v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1280.0, 800.0])
            .with_resizable(true)
            .with_drag_and_drop(true),
        persist_window: true,
        persistence_path: Some(config::config_file("psdview.json", &path_config)),
        ..Default::default()
    };

    // Run the app
    eframe::run_native(
        "psdview",
        native_options,
        Box::new(move |cc| {
            // Load persisted app state if available, otherwise create default
            let mut app: PsdViewerApp = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted state found, creating default app");
                    PsdViewerApp::default()
                });

            // CLI file wins over the reopen-last-file preference
            app.pending_file = args.file_path.clone().or_else(|| {
                if app.settings.reopen_last_file {
                    app.settings.last_file.clone()
                } else {
                    None
                }
            });

            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
