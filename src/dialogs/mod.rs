//! Modal dialogs.

pub mod settings;

pub use settings::{AppSettings, render_settings_window};
