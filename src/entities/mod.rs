//! Core data entities: documents, layers, raster surfaces.

pub mod document;
pub mod layer;
pub mod surface;

pub use document::{LayerCounts, PsdDocument, color_mode_label};
pub use layer::{Bounds, Layer, LayerKind};
pub use surface::{Surface, SurfaceError};
