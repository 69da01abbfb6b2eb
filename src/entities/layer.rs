//! Layer tree node for a parsed Photoshop document.
//!
//! # Architecture
//!
//! A document owns an ordered tree of `Layer` nodes: leaves hold raster
//! content, groups hold children. Children and raster surfaces are
//! `Arc`-shared so that the copy-on-write visibility toggle in
//! `PsdDocument` reallocates only the path to the modified node and shares
//! every untouched subtree.
//!
//! # Identity
//!
//! Layer ids are generated at conversion time and are unique within one
//! parsed document but NOT stable across re-parses of the same file.
//! Selection is therefore cleared whenever a new document is installed.

use std::sync::Arc;
use uuid::Uuid;

use super::surface::Surface;

/// Variant tag for a layer node.
///
/// Classification happens once in the parser adapter with a fixed
/// precedence (group > text > effect > masked > shape > image > normal);
/// a text layer that is also a group is a `Group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Normal,
    Group,
    Text,
    Effect,
    Masked,
    Shape,
    Image,
}

impl LayerKind {
    /// Human-readable tag for the info panel
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Normal => "Normal",
            LayerKind::Group => "Group",
            LayerKind::Text => "Text",
            LayerKind::Effect => "Effect",
            LayerKind::Masked => "Masked",
            LayerKind::Shape => "Shape",
            LayerKind::Image => "Image",
        }
    }
}

/// Layer bounding box.
///
/// Width and height are always derived from the source record's edges
/// (`width = right - left`, `height = bottom - top`) and are never set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    /// Derive a bounding box from edge coordinates.
    ///
    /// Degenerate records (right < left) clamp to zero size.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            width: (right - left).max(0) as u32,
            height: (bottom - top).max(0) as u32,
        }
    }
}

/// A node in the layer tree.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Generated identity, unique within one parse
    pub id: Uuid,
    /// Display name from the document (decoder supplies a fallback)
    pub name: String,
    pub kind: LayerKind,
    /// The only field that changes post-construction, and only through the
    /// document's copy-on-write toggle
    pub visible: bool,
    /// Unit interval (0.0..=1.0); converted from the decoder's 0-255 scale
    pub opacity: f32,
    pub bounds: Bounds,
    /// Raster content (leaves only); shared, never mutated after creation
    pub surface: Option<Arc<Surface>>,
    /// Small preview of the layer's own raster as a PNG data URI
    pub thumbnail: Option<String>,
    /// Non-empty only for group nodes
    pub children: Vec<Arc<Layer>>,
}

impl Layer {
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Opacity as a display percentage (0-100)
    pub fn opacity_percent(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_edges() {
        let bounds = Bounds::from_edges(10, 20, 110, 70);
        assert_eq!(bounds.left, 10);
        assert_eq!(bounds.top, 20);
        assert_eq!(bounds.width, 100);
        assert_eq!(bounds.height, 50);
    }

    #[test]
    fn test_bounds_degenerate_edges_clamp_to_zero() {
        let bounds = Bounds::from_edges(50, 50, 10, 10);
        assert_eq!(bounds.width, 0);
        assert_eq!(bounds.height, 0);
    }

    #[test]
    fn test_opacity_percent_rounds() {
        let layer = Layer {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            kind: LayerKind::Normal,
            visible: true,
            opacity: 0.502,
            bounds: Bounds::default(),
            surface: None,
            thumbnail: None,
            children: Vec::new(),
        };
        assert_eq!(layer.opacity_percent(), 50);
    }
}
