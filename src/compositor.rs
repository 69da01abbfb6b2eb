//! CPU compositor - flattens visible layers into one preview raster.
//!
//! Walks the layer tree in structural order (bottom-most first, so later
//! siblings land on top) and source-over blits every effectively-visible
//! leaf's surface onto a document-sized canvas at its stored offset,
//! applying the leaf's opacity against the accumulated alpha.
//!
//! Two deliberate semantics, decided in DESIGN.md:
//! - a hidden group hides its entire subtree;
//! - group opacity is NOT applied as a separate offscreen composite pass
//!   (only leaf opacity contributes), a known simplification.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::entities::{Layer, PsdDocument, Surface};

/// Flatten the document's visible layers onto a fresh canvas.
///
/// `overrides` maps layer ids to a desired visibility; layers absent from
/// the map keep their stored flag. Returns `None` for zero-sized
/// documents.
pub fn compose(doc: &PsdDocument, overrides: &HashMap<Uuid, bool>) -> Option<Surface> {
    if doc.width == 0 || doc.height == 0 {
        debug!("compose: zero-sized document {}x{}", doc.width, doc.height);
        return None;
    }

    let mut canvas = Surface::new(doc.width, doc.height);
    draw_layers(&mut canvas, &doc.layers, overrides);
    Some(canvas)
}

fn draw_layers(canvas: &mut Surface, layers: &[Arc<Layer>], overrides: &HashMap<Uuid, bool>) {
    for layer in layers {
        let visible = overrides.get(&layer.id).copied().unwrap_or(layer.visible);
        if !visible {
            // Effective visibility is the conjunction along the ancestor
            // path: skipping here hides the whole subtree
            continue;
        }

        if layer.children.is_empty() {
            if let Some(surface) = &layer.surface {
                canvas.blit_over(surface, layer.bounds.left, layer.bounds.top, layer.opacity);
            }
        } else {
            draw_layers(canvas, &layer.children, overrides);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Bounds, LayerKind};

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Surface {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Surface::from_rgba(width, height, pixels).unwrap()
    }

    fn raster(name: &str, visible: bool, opacity: f32, left: i32, top: i32, surface: Surface) -> Arc<Layer> {
        Arc::new(Layer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: LayerKind::Image,
            visible,
            opacity,
            bounds: Bounds::from_edges(left, top, left + surface.width() as i32, top + surface.height() as i32),
            surface: Some(Arc::new(surface)),
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

    fn doc(width: u32, height: u32, layers: Vec<Arc<Layer>>) -> PsdDocument {
        PsdDocument {
            name: "t.psd".to_string(),
            file_size: 0,
            width,
            height,
            resolution: 72.0,
            color_mode: "RGB".to_string(),
            channels: 3,
            layers,
            thumbnail: None,
            preview: None,
            revision: 1,
        }
    }

    fn pixel(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * surface.width() + x) * 4) as usize;
        let p = surface.pixels();
        [p[i], p[i + 1], p[i + 2], p[i + 3]]
    }

    #[test]
    fn test_compose_zero_sized_document_is_none() {
        let document = doc(0, 10, Vec::new());
        assert!(compose(&document, &HashMap::new()).is_none());
    }

    #[test]
    fn test_compose_places_layer_at_offset() {
        let document = doc(4, 4, vec![raster("r", true, 1.0, 2, 1, solid(1, 1, [255, 0, 0, 255]))]);
        let canvas = compose(&document, &HashMap::new()).unwrap();

        assert_eq!(pixel(&canvas, 2, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_compose_later_siblings_draw_on_top() {
        let bottom = raster("bottom", true, 1.0, 0, 0, solid(2, 2, [255, 0, 0, 255]));
        let top = raster("top", true, 1.0, 0, 0, solid(2, 2, [0, 255, 0, 255]));
        let document = doc(2, 2, vec![bottom, top]);

        let canvas = compose(&document, &HashMap::new()).unwrap();
        assert_eq!(pixel(&canvas, 0, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn test_compose_skips_hidden_layers() {
        let hidden = raster("h", false, 1.0, 0, 0, solid(2, 2, [255, 0, 0, 255]));
        let document = doc(2, 2, vec![hidden]);

        let canvas = compose(&document, &HashMap::new()).unwrap();
        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_compose_hidden_group_hides_subtree() {
        let child = raster("c", true, 1.0, 0, 0, solid(2, 2, [255, 0, 0, 255]));
        let document = doc(2, 2, vec![group("g", false, vec![child])]);

        let canvas = compose(&document, &HashMap::new()).unwrap();
        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_compose_override_beats_stored_flag() {
        let layer = raster("r", true, 1.0, 0, 0, solid(1, 1, [255, 0, 0, 255]));
        let id = layer.id;
        let document = doc(1, 1, vec![layer]);

        let mut overrides = HashMap::new();
        overrides.insert(id, false);
        let canvas = compose(&document, &overrides).unwrap();
        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 0, 0]);

        // And the other direction: un-hiding a hidden layer
        let hidden = raster("h", false, 1.0, 0, 0, solid(1, 1, [0, 0, 255, 255]));
        let hidden_id = hidden.id;
        let document = doc(1, 1, vec![hidden]);
        let mut overrides = HashMap::new();
        overrides.insert(hidden_id, true);
        let canvas = compose(&document, &overrides).unwrap();
        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_compose_applies_leaf_opacity() {
        let layer = raster("half", true, 0.5, 0, 0, solid(1, 1, [255, 0, 0, 255]));
        let document = doc(1, 1, vec![layer]);

        let canvas = compose(&document, &HashMap::new()).unwrap();
        let px = pixel(&canvas, 0, 0);
        assert_eq!(px[0], 255);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn test_compose_children_drawn_at_own_offsets() {
        let child = raster("c", true, 1.0, 1, 1, solid(1, 1, [9, 9, 9, 255]));
        let document = doc(3, 3, vec![group("g", true, vec![child])]);

        let canvas = compose(&document, &HashMap::new()).unwrap();
        assert_eq!(pixel(&canvas, 1, 1), [9, 9, 9, 255]);
    }
}
