//! PSDVIEW - Photoshop document viewer library
//!
//! Re-exports all modules for use by the binary target.

// App modules
pub mod cli;
pub mod compositor;
pub mod config;
pub mod decode;
pub mod dialogs;
pub mod entities;
pub mod layout;
pub mod loader;
pub mod parser;
pub mod store;
pub mod theme;
pub mod utils;
pub mod widgets;

// Re-export commonly used types
pub use entities::{Bounds, Layer, LayerCounts, LayerKind, PsdDocument, Surface};
pub use store::DocumentStore;
pub use theme::{ResolvedTheme, ThemeMode};
