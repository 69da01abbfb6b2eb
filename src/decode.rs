//! External decoder boundary.
//!
//! **Why**: PSD binary decoding is delegated entirely to the `psd` crate;
//! nothing else in this codebase inspects PSD structure. This module owns
//! the translation from that crate's flat layer/group lists (linked by
//! parent ids) into the ordered `RawLayer` tree the parser adapter
//! consumes, so the adapter never sees backend types.
//!
//! **Used by**: parser (the only caller)
//!
//! # Backend notes
//!
//! - The backend exposes neither the resolution image resource nor the
//!   embedded thumbnail; resolution falls back to 72 DPI and
//!   `RawDocument::thumbnail` stays `None`.
//! - Text, effect and mask records are not surfaced by the backend; the
//!   corresponding `RawLayer` flags decode as `false` and exist for the
//!   adapter's classification contract.

use std::collections::HashMap;

use log::warn;
use psd::{ColorMode, Psd};

/// Feature flags forwarded by the caller.
///
/// `prefer_raw_pixels` is kept for contract parity: this backend always
/// yields raw RGBA buffers, never a pre-built drawable surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub skip_layer_images: bool,
    pub skip_composite: bool,
    pub skip_thumbnail: bool,
    pub prefer_raw_pixels: bool,
}

/// Raw RGBA pixel buffer (straight alpha, row-major)
#[derive(Debug, Clone, PartialEq)]
pub struct RawPixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// One layer record as reported by the decoder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLayer {
    pub name: String,
    pub hidden: bool,
    /// Decoder scale: 0-255
    pub opacity: u8,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    /// Layer-local pixels, blitted at (left, top)
    pub pixels: Option<RawPixels>,
    pub has_text: bool,
    pub has_effects: bool,
    pub has_mask: bool,
    pub has_vector_mask: bool,
    pub children: Vec<RawLayer>,
}

/// Document-level record out of the decoder
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub width: u32,
    pub height: u32,
    pub resolution: f64,
    /// Photoshop color-mode number (3 = RGB, ...)
    pub color_mode: u8,
    /// Source channel count (derived from the color mode)
    pub channels: u8,
    /// Flattened composite of the whole document
    pub composite: Option<RawPixels>,
    /// Embedded thumbnail resource; never produced by this backend
    pub thumbnail: Option<RawPixels>,
    /// Ordered top-level layers, bottom-most first
    pub layers: Vec<RawLayer>,
}

/// Decoder failure, wrapping the backend error as the cause
#[derive(Debug)]
pub struct DecodeError {
    message: String,
    source: Option<BackendError>,
}

impl DecodeError {
    fn backend(err: impl std::fmt::Display) -> Self {
        let detail = err.to_string();
        Self {
            message: format!("PSD decode failed: {}", detail),
            source: Some(BackendError(detail)),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Backend error detail, boxed into the cause chain
#[derive(Debug)]
pub struct BackendError(String);

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BackendError {}

/// Decode raw PSD/PSB bytes into a `RawDocument`.
pub fn decode_bytes(bytes: &[u8], options: &DecodeOptions) -> Result<RawDocument, DecodeError> {
    let psd = Psd::from_bytes(bytes).map_err(DecodeError::backend)?;

    let width = psd.width();
    let height = psd.height();

    let composite = if options.skip_composite || width == 0 || height == 0 {
        None
    } else {
        Some(RawPixels {
            width,
            height,
            rgba: psd.rgba(),
        })
    };

    // Flatten the backend's layer and group lists into parent-linked
    // records, then reassemble document order.
    let mut flat_layers = Vec::with_capacity(psd.layers().len());
    for layer in psd.layers() {
        let record = RawLayer {
            name: layer.name().to_string(),
            hidden: !layer.visible(),
            opacity: layer.opacity(),
            left: layer.layer_left(),
            top: layer.layer_top(),
            right: layer.layer_right(),
            bottom: layer.layer_bottom(),
            pixels: if options.skip_layer_images {
                None
            } else {
                layer_pixels(
                    layer.rgba(),
                    layer.layer_left(),
                    layer.layer_top(),
                    layer.layer_right(),
                    layer.layer_bottom(),
                    width,
                    height,
                )
            },
            ..RawLayer::default()
        };
        flat_layers.push(FlatNode {
            parent_id: layer.parent_id(),
            record,
        });
    }

    let mut flat_groups = HashMap::new();
    for (id, group) in psd.groups() {
        let record = RawLayer {
            name: group.name().to_string(),
            hidden: !group.visible(),
            opacity: group.opacity(),
            ..RawLayer::default()
        };
        flat_groups.insert(
            *id,
            FlatNode {
                parent_id: group.parent_id(),
                record,
            },
        );
    }

    let color_mode = color_mode_number(psd.color_mode());

    Ok(RawDocument {
        width,
        height,
        // Not exposed by the backend; Photoshop's default
        resolution: 72.0,
        color_mode,
        channels: channel_count(color_mode),
        composite,
        thumbnail: None,
        layers: assemble_tree(flat_layers, flat_groups),
    })
}

/// Normalize a backend pixel buffer to layer-local dimensions.
///
/// Depending on the backend, `rgba` arrives either layer-sized or placed
/// on a document-sized canvas; the latter is cropped to the layer bounds
/// so that every `RawLayer` blits at (left, top). Unexpected buffer sizes
/// degrade to no pixels rather than failing the decode.
fn layer_pixels(
    rgba: Vec<u8>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    doc_width: u32,
    doc_height: u32,
) -> Option<RawPixels> {
    let width = (right - left).max(0) as u32;
    let height = (bottom - top).max(0) as u32;
    if width == 0 || height == 0 {
        return None;
    }

    let layer_len = width as usize * height as usize * 4;
    let doc_len = doc_width as usize * doc_height as usize * 4;

    if rgba.len() == layer_len {
        return Some(RawPixels { width, height, rgba });
    }
    if rgba.len() == doc_len {
        return Some(crop_rgba(&rgba, doc_width, doc_height, left, top, width, height));
    }

    warn!(
        "Unexpected layer buffer size {} (layer {}x{}, document {}x{}); dropping pixels",
        rgba.len(),
        width,
        height,
        doc_width,
        doc_height
    );
    None
}

/// Copy a rectangle out of a document-sized RGBA buffer. Regions outside
/// the document stay transparent.
fn crop_rgba(
    rgba: &[u8],
    doc_width: u32,
    doc_height: u32,
    left: i32,
    top: i32,
    width: u32,
    height: u32,
) -> RawPixels {
    let mut out = vec![0u8; width as usize * height as usize * 4];
    for row in 0..height as i64 {
        let src_y = top as i64 + row;
        if src_y < 0 || src_y >= doc_height as i64 {
            continue;
        }
        for col in 0..width as i64 {
            let src_x = left as i64 + col;
            if src_x < 0 || src_x >= doc_width as i64 {
                continue;
            }
            let src = ((src_y * doc_width as i64 + src_x) * 4) as usize;
            let dst = ((row * width as i64 + col) * 4) as usize;
            out[dst..dst + 4].copy_from_slice(&rgba[src..src + 4]);
        }
    }
    RawPixels {
        width,
        height,
        rgba: out,
    }
}

/// Parent-linked record before tree reassembly
#[derive(Debug)]
struct FlatNode {
    parent_id: Option<u32>,
    record: RawLayer,
}

/// Placed group under assembly
struct Slot {
    record: RawLayer,
    children: Vec<ChildRef>,
}

enum ChildRef {
    Layer(RawLayer),
    Group(u32),
}

/// Reassemble the document-ordered tree from flat parent-linked lists.
///
/// Layers keep their list order; a group takes its position among siblings
/// at the point its first member appears (group ids are assigned in
/// document order by the backend, so groups that never contain a layer are
/// appended afterwards in id order).
fn assemble_tree(layers: Vec<FlatNode>, mut groups: HashMap<u32, FlatNode>) -> Vec<RawLayer> {
    let mut roots: Vec<ChildRef> = Vec::new();
    let mut slots: HashMap<u32, Slot> = HashMap::new();

    for flat in layers {
        match flat.parent_id {
            Some(parent) => {
                ensure_group(parent, &mut groups, &mut slots, &mut roots);
                if let Some(slot) = slots.get_mut(&parent) {
                    slot.children.push(ChildRef::Layer(flat.record));
                } else {
                    // Orphaned parent id: keep the layer at the root
                    roots.push(ChildRef::Layer(flat.record));
                }
            }
            None => roots.push(ChildRef::Layer(flat.record)),
        }
    }

    // Groups with no contained layers (empty groups), in id order
    let mut remaining: Vec<u32> = groups.keys().copied().collect();
    remaining.sort_unstable();
    for id in remaining {
        ensure_group(id, &mut groups, &mut slots, &mut roots);
    }

    build_refs(roots, &mut slots)
}

/// Place a group (and its ancestor chain) into the tree on first sight
fn ensure_group(
    id: u32,
    groups: &mut HashMap<u32, FlatNode>,
    slots: &mut HashMap<u32, Slot>,
    roots: &mut Vec<ChildRef>,
) {
    if slots.contains_key(&id) {
        return;
    }
    let Some(flat) = groups.remove(&id) else {
        return;
    };
    slots.insert(
        id,
        Slot {
            record: flat.record,
            children: Vec::new(),
        },
    );
    match flat.parent_id {
        Some(parent) => {
            ensure_group(parent, groups, slots, roots);
            if let Some(slot) = slots.get_mut(&parent) {
                slot.children.push(ChildRef::Group(id));
            } else {
                roots.push(ChildRef::Group(id));
            }
        }
        None => roots.push(ChildRef::Group(id)),
    }
}

fn build_refs(refs: Vec<ChildRef>, slots: &mut HashMap<u32, Slot>) -> Vec<RawLayer> {
    let mut out = Vec::with_capacity(refs.len());
    for child in refs {
        match child {
            ChildRef::Layer(record) => out.push(record),
            ChildRef::Group(id) => {
                if let Some(slot) = slots.remove(&id) {
                    let mut record = slot.record;
                    record.children = build_refs(slot.children, slots);
                    out.push(record);
                }
            }
        }
    }
    out
}

fn color_mode_number(mode: ColorMode) -> u8 {
    match mode {
        ColorMode::Bitmap => 0,
        ColorMode::Grayscale => 1,
        ColorMode::Indexed => 2,
        ColorMode::Rgb => 3,
        ColorMode::Cmyk => 4,
        ColorMode::Multichannel => 7,
        ColorMode::Duotone => 8,
        ColorMode::Lab => 9,
    }
}

/// Source channel count by color mode (alpha excluded)
fn channel_count(color_mode: u8) -> u8 {
    match color_mode {
        0 | 1 | 2 | 8 => 1,
        4 => 4,
        _ => 3,
    }
}
