//! Parser adapter: reshape decoder output into application documents.
//!
//! # Architecture
//!
//! A deliberately thin boundary layer, a set of stateless functions:
//! validate the file before any decode attempt, hand the bytes to
//! `decode`, then convert the raw tree into `entities` types and
//! synthesize the auxiliary bitmaps (document thumbnail/preview, per-layer
//! thumbnails, recomposited previews).
//!
//! # Failure policy
//!
//! Anything that prevents producing a usable document is a `ParseError`
//! surfaced to the caller. Anything that only degrades an auxiliary bitmap
//! (missing buffer, zero-sized source, encode failure) is logged at `warn`
//! and degrades to "no image". No retries anywhere.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::warn;
use uuid::Uuid;

use crate::compositor;
use crate::decode::{self, DecodeError, DecodeOptions, RawDocument, RawLayer, RawPixels};
use crate::entities::{Bounds, Layer, LayerKind, PsdDocument, Surface, color_mode_label};
use crate::utils;

/// Canonical upload ceiling; larger files are rejected before decoding
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Bound for the document thumbnail (longest edge, pixels)
pub const THUMBNAIL_MAX_DIM: u32 = 200;
/// Bound for the high-quality preview
pub const PREVIEW_MAX_DIM: u32 = 2048;
/// Bound for per-layer thumbnails
pub const LAYER_THUMBNAIL_MAX_DIM: u32 = 64;

/// Load failure, one variant per user-distinguishable cause
#[derive(Debug)]
pub enum ParseError {
    /// File exceeds `MAX_FILE_SIZE`
    TooLarge { size: u64 },
    /// Extension is not .psd/.psb (checked before content)
    UnsupportedFormat { name: String },
    /// Zero-byte file
    EmptyFile,
    /// Filesystem failure while reading
    Io(std::io::Error),
    /// The external decoder rejected the bytes
    Decode(DecodeError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::TooLarge { size } => write!(
                f,
                "File is too large ({}); please choose a PSD file under {}",
                utils::format_bytes(*size),
                utils::format_bytes(MAX_FILE_SIZE)
            ),
            ParseError::UnsupportedFormat { name } => {
                write!(f, "Unsupported format: {} (expected a .psd or .psb file)", name)
            }
            ParseError::EmptyFile => write!(f, "File is empty; please choose a valid PSD file"),
            ParseError::Io(e) => write!(f, "Failed to read file: {}", e),
            ParseError::Decode(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            ParseError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// Pre-decode validation: size ceiling, extension, emptiness.
///
/// Runs against file metadata only, before any bytes are decoded. Each
/// rejection carries its own message; a `.png` is rejected as unsupported
/// regardless of its actual content.
pub fn validate_file(path: &Path, size: u64) -> Result<(), ParseError> {
    if size > MAX_FILE_SIZE {
        return Err(ParseError::TooLarge { size });
    }
    if !utils::formats::is_psd(path) {
        return Err(ParseError::UnsupportedFormat {
            name: display_name(path),
        });
    }
    if size == 0 {
        return Err(ParseError::EmptyFile);
    }
    Ok(())
}

/// Load and parse a PSD/PSB file from disk.
pub fn parse_file(path: &Path) -> Result<PsdDocument, ParseError> {
    let metadata = fs::metadata(path).map_err(ParseError::Io)?;
    validate_file(path, metadata.len())?;

    let bytes = fs::read(path).map_err(ParseError::Io)?;
    parse_bytes(&display_name(path), metadata.len(), &bytes)
}

/// Decode already-read bytes and convert to a document.
pub fn parse_bytes(name: &str, file_size: u64, bytes: &[u8]) -> Result<PsdDocument, ParseError> {
    let raw = decode::decode_bytes(bytes, &DecodeOptions::default()).map_err(ParseError::Decode)?;
    Ok(convert_document(raw, name, file_size))
}

/// Recomposite the preview after visibility changes.
///
/// `overrides` maps layer ids to a desired visibility; layers not in the
/// map keep their stored flag. Returns `None` (never an error) when there
/// is nothing to draw or encoding fails.
pub fn regenerate_preview(
    doc: &PsdDocument,
    overrides: &HashMap<Uuid, bool>,
) -> Option<String> {
    let canvas = compositor::compose(doc, overrides)?;
    encode_scaled(&canvas, PREVIEW_MAX_DIM)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("untitled")
        .to_string()
}

fn convert_document(raw: RawDocument, name: &str, file_size: u64) -> PsdDocument {
    let RawDocument {
        width,
        height,
        resolution,
        color_mode,
        channels,
        composite,
        thumbnail: _,
        layers,
    } = raw;

    let composite = composite.and_then(surface_from_pixels);
    let thumbnail = composite.as_ref().and_then(|s| encode_scaled(s, THUMBNAIL_MAX_DIM));
    let preview = composite.as_ref().and_then(|s| encode_scaled(s, PREVIEW_MAX_DIM));

    let mut doc = PsdDocument {
        name: name.to_string(),
        file_size,
        width,
        height,
        resolution,
        color_mode: color_mode_label(color_mode).to_string(),
        channels,
        layers: convert_layers(layers),
        thumbnail,
        preview,
        revision: 0,
    };
    doc.stamp_revision();
    doc
}

fn convert_layers(raw: Vec<RawLayer>) -> Vec<Arc<Layer>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, layer)| Arc::new(convert_layer(layer, index)))
        .collect()
}

fn convert_layer(raw: RawLayer, index: usize) -> Layer {
    let kind = classify(&raw);

    let RawLayer {
        name,
        hidden,
        opacity,
        left,
        top,
        right,
        bottom,
        pixels,
        children,
        ..
    } = raw;

    let surface = pixels.and_then(surface_from_pixels).map(Arc::new);
    let thumbnail = surface
        .as_ref()
        .and_then(|s| encode_scaled(s, LAYER_THUMBNAIL_MAX_DIM));

    Layer {
        id: Uuid::new_v4(),
        name: if name.is_empty() {
            format!("Layer {}", index + 1)
        } else {
            name
        },
        kind,
        visible: !hidden,
        // Decoder scale 0-255 -> canonical unit interval
        opacity: opacity as f32 / 255.0,
        bounds: Bounds::from_edges(left, top, right, bottom),
        surface,
        thumbnail,
        children: convert_layers(children),
    }
}

/// Fixed-precedence variant classification.
///
/// The order is significant: a text layer that is also a group classifies
/// as a group, not text.
fn classify(raw: &RawLayer) -> LayerKind {
    if !raw.children.is_empty() {
        LayerKind::Group
    } else if raw.has_text {
        LayerKind::Text
    } else if raw.has_effects {
        LayerKind::Effect
    } else if raw.has_mask {
        LayerKind::Masked
    } else if raw.has_vector_mask {
        LayerKind::Shape
    } else if raw.pixels.is_some() {
        LayerKind::Image
    } else {
        LayerKind::Normal
    }
}

/// Materialize a raw pixel buffer onto a drawable surface.
///
/// Invalid buffers and zero-sized sources degrade to `None`.
fn surface_from_pixels(pixels: RawPixels) -> Option<Surface> {
    match Surface::from_rgba(pixels.width, pixels.height, pixels.rgba) {
        Ok(surface) if !surface.is_empty() => Some(surface),
        Ok(_) => None,
        Err(e) => {
            warn!("Dropping invalid pixel buffer: {}", e);
            None
        }
    }
}

/// Scale to a bounded box and encode as a PNG data URI.
fn encode_scaled(surface: &Surface, max_dim: u32) -> Option<String> {
    if surface.is_empty() {
        return None;
    }
    let scaled = surface.scaled_to_fit(max_dim);
    match scaled.to_png_data_uri() {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!("Bitmap synthesis failed: {}", e);
            None
        }
    }
}
