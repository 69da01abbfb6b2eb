//! UI widgets: panels and shared dialog helpers.

pub mod file_dialogs;
pub mod info_panel;
pub mod layer_tree;
pub mod status_bar;
pub mod viewer;

pub use status_bar::StatusBar;
pub use viewer::ViewerState;
