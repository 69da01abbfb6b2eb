//! Parsed Photoshop document: metadata plus the layer tree.
//!
//! # Replacement, not mutation
//!
//! A `PsdDocument` is never modified in place once installed in the store.
//! Operations that "change" it (visibility toggle, preview refresh) build a
//! replacement that shares untouched subtrees and carry a fresh `revision`.
//! Observers (the viewer's texture upload) treat a revision change as the
//! signal that a redraw is needed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use super::layer::Layer;

/// Monotonic source for document revisions; every constructed or replaced
/// document gets a value never handed out before in this process.
static REVISIONS: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    REVISIONS.fetch_add(1, Ordering::Relaxed)
}

/// Recursive tally over the layer tree.
///
/// Groups count as one node plus their children; `total = visible + hidden`
/// at every depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerCounts {
    pub total: usize,
    pub visible: usize,
    pub hidden: usize,
}

/// Root record for one parsed PSD/PSB file.
#[derive(Debug, Clone)]
pub struct PsdDocument {
    /// Source file name (not a path; display only)
    pub name: String,
    /// Source file size in bytes
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    /// Dots per inch; decoder falls back to 72 when the resource is absent
    pub resolution: f64,
    /// Color mode label ("RGB", "CMYK", ...)
    pub color_mode: String,
    /// Source channel count reported by the decoder
    pub channels: u8,
    /// Ordered top-level layers, bottom-most first (document order)
    pub layers: Vec<Arc<Layer>>,
    /// Small composite preview (<= 200 px) as a PNG data URI
    pub thumbnail: Option<String>,
    /// High-quality composite preview (<= 2048 px) as a PNG data URI
    pub preview: Option<String>,
    /// Bumped on every wholesale replacement; see module docs
    pub revision: u64,
}

impl PsdDocument {
    /// Assign a fresh revision. Called by the parser on construction and by
    /// every replacement-producing operation below.
    pub fn stamp_revision(&mut self) {
        self.revision = next_revision();
    }

    /// Pre-order depth-first lookup: parent before its own children, before
    /// the next sibling.
    pub fn find_layer(&self, id: Uuid) -> Option<&Layer> {
        find_in(&self.layers, id)
    }

    /// Tally total/visible/hidden across the whole tree in one traversal.
    pub fn layer_counts(&self) -> LayerCounts {
        let mut counts = LayerCounts::default();
        count_in(&self.layers, &mut counts);
        counts
    }

    /// Produce a replacement document with exactly one node's visibility
    /// flag flipped.
    ///
    /// Copy-on-write: only the nodes on the path from a root to the target
    /// are reallocated; every other subtree (and every raster surface) is
    /// shared with `self` by reference. Returns `None` when no node carries
    /// the given id, in which case callers must leave the current document
    /// untouched.
    pub fn with_visibility_toggled(&self, id: Uuid) -> Option<PsdDocument> {
        let layers = toggle_in(&self.layers, id)?;
        let mut doc = PsdDocument {
            layers,
            ..self.clone()
        };
        doc.stamp_revision();
        Some(doc)
    }

    /// Produce a replacement document carrying a recomposited preview.
    pub fn with_preview(&self, preview: Option<String>) -> PsdDocument {
        let mut doc = self.clone();
        doc.preview = preview;
        doc.stamp_revision();
        doc
    }
}

fn find_in(layers: &[Arc<Layer>], id: Uuid) -> Option<&Layer> {
    for layer in layers {
        if layer.id == id {
            return Some(layer);
        }
        if let Some(found) = find_in(&layer.children, id) {
            return Some(found);
        }
    }
    None
}

fn count_in(layers: &[Arc<Layer>], counts: &mut LayerCounts) {
    for layer in layers {
        counts.total += 1;
        if layer.visible {
            counts.visible += 1;
        } else {
            counts.hidden += 1;
        }
        count_in(&layer.children, counts);
    }
}

/// Rebuild `layers` with the target node's flag flipped, sharing siblings
/// and untouched subtrees. `None` when the id is absent from this subtree.
fn toggle_in(layers: &[Arc<Layer>], id: Uuid) -> Option<Vec<Arc<Layer>>> {
    for (index, layer) in layers.iter().enumerate() {
        if layer.id == id {
            let mut flipped = (**layer).clone();
            flipped.visible = !flipped.visible;
            let mut out = layers.to_vec();
            out[index] = Arc::new(flipped);
            return Some(out);
        }
        if let Some(new_children) = toggle_in(&layer.children, id) {
            let mut parent = (**layer).clone();
            parent.children = new_children;
            let mut out = layers.to_vec();
            out[index] = Arc::new(parent);
            return Some(out);
        }
    }
    None
}

/// Map a Photoshop color-mode number to its display label.
///
/// Unknown values fall back to "RGB", matching the most common mode.
pub fn color_mode_label(mode: u8) -> &'static str {
    match mode {
        0 => "Bitmap",
        1 => "Grayscale",
        2 => "Indexed",
        3 => "RGB",
        4 => "CMYK",
        7 => "Multichannel",
        8 => "Duotone",
        9 => "Lab",
        _ => "RGB",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::layer::{Bounds, LayerKind};

    fn leaf(name: &str, visible: bool) -> Arc<Layer> {
        Arc::new(Layer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: LayerKind::Normal,
            visible,
            opacity: 1.0,
            bounds: Bounds::default(),
            surface: None,
            thumbnail: None,
            children: Vec::new(),
        })
    }

    fn group(name: &str, visible: bool, children: Vec<Arc<Layer>>) -> Arc<Layer> {
        Arc::new(Layer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: LayerKind::Group,
            visible,
            opacity: 1.0,
            bounds: Bounds::default(),
            surface: None,
            thumbnail: None,
            children,
        })
    }

    fn doc(layers: Vec<Arc<Layer>>) -> PsdDocument {
        let mut doc = PsdDocument {
            name: "test.psd".to_string(),
            file_size: 1024,
            width: 100,
            height: 100,
            resolution: 72.0,
            color_mode: "RGB".to_string(),
            channels: 3,
            layers,
            thumbnail: None,
            preview: None,
            revision: 0,
        };
        doc.stamp_revision();
        doc
    }

    #[test]
    fn test_layer_counts_group_scenario() {
        // Group "G" with children "A" (visible) and "B" (hidden)
        let document = doc(vec![group("G", true, vec![leaf("A", true), leaf("B", false)])]);
        let counts = document.layer_counts();
        assert_eq!(counts, LayerCounts { total: 3, visible: 2, hidden: 1 });
    }

    #[test]
    fn test_layer_counts_sum_invariant() {
        let document = doc(vec![
            leaf("a", true),
            group("g", false, vec![leaf("b", false), group("gg", true, vec![leaf("c", true)])]),
        ]);
        let counts = document.layer_counts();
        assert_eq!(counts.total, 5);
        assert_eq!(counts.visible + counts.hidden, counts.total);
        assert_eq!(counts.hidden, 2);
    }

    #[test]
    fn test_find_layer_pre_order() {
        let first = leaf("match", true);
        let nested = leaf("match", true);
        let document = doc(vec![first.clone(), group("g", true, vec![nested.clone()])]);

        // Same name, different ids: lookup is by identity and finds the
        // exact node regardless of position
        assert_eq!(document.find_layer(first.id).unwrap().id, first.id);
        assert_eq!(document.find_layer(nested.id).unwrap().id, nested.id);
        assert!(document.find_layer(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_toggle_flips_exactly_one_node() {
        let a = leaf("A", true);
        let b = leaf("B", false);
        let g = group("G", true, vec![a.clone(), b.clone()]);
        let document = doc(vec![g.clone()]);

        let toggled = document.with_visibility_toggled(b.id).unwrap();
        assert_ne!(toggled.revision, document.revision);

        let new_b = toggled.find_layer(b.id).unwrap();
        assert!(new_b.visible);
        assert!(toggled.find_layer(a.id).unwrap().visible);
        assert!(toggled.find_layer(g.id).unwrap().visible);

        // Original tree untouched
        assert!(!document.find_layer(b.id).unwrap().visible);
    }

    #[test]
    fn test_toggle_unknown_id_is_none() {
        let document = doc(vec![leaf("a", true)]);
        assert!(document.with_visibility_toggled(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        let a = leaf("A", true);
        let document = doc(vec![a.clone()]);

        let once = document.with_visibility_toggled(a.id).unwrap();
        let twice = once.with_visibility_toggled(a.id).unwrap();

        assert!(twice.find_layer(a.id).unwrap().visible);
        // Each toggle is a wholesale replacement
        assert_ne!(twice.revision, document.revision);
        assert_ne!(twice.revision, once.revision);
    }

    #[test]
    fn test_toggle_shares_untouched_subtrees() {
        let sibling = group("other", true, vec![leaf("x", true), leaf("y", true)]);
        let target = leaf("t", true);
        let document = doc(vec![sibling.clone(), group("g", true, vec![target.clone()])]);

        let toggled = document.with_visibility_toggled(target.id).unwrap();

        // The untouched sibling subtree is the same allocation
        assert!(Arc::ptr_eq(&document.layers[0], &toggled.layers[0]));
        // The path to the target was reallocated
        assert!(!Arc::ptr_eq(&document.layers[1], &toggled.layers[1]));
    }

    #[test]
    fn test_color_mode_labels() {
        assert_eq!(color_mode_label(3), "RGB");
        assert_eq!(color_mode_label(4), "CMYK");
        assert_eq!(color_mode_label(9), "Lab");
        assert_eq!(color_mode_label(42), "RGB");
    }
}
