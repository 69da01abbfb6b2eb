//! Owned RGBA raster surface with scaled blit and data-URI encoding.
//!
//! **Why**: Layer pixels and composited previews need one in-memory raster
//! representation that supports the three operations the viewer performs:
//! alpha-blended blit, aspect-preserving downscale, and lossless encoding
//! for direct use as an image source.
//!
//! **Used by**: decode (layer/composite buffers), compositor (canvas),
//! parser (thumbnail/preview synthesis), viewer (texture upload)

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ImageEncoder, RgbaImage};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Prefix for lossless raster data URIs produced by `to_png_data_uri`.
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Surface errors
#[derive(Debug)]
pub enum SurfaceError {
    /// Pixel buffer length does not match width * height * 4
    BufferSize { expected: usize, actual: usize },
    /// PNG encoding failed
    Encode(String),
    /// Data URI is not a base64 PNG this module produced
    DataUri(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::BufferSize { expected, actual } => {
                write!(f, "Pixel buffer size mismatch: expected {} bytes, got {}", expected, actual)
            }
            SurfaceError::Encode(e) => write!(f, "PNG encode error: {}", e),
            SurfaceError::DataUri(e) => write!(f, "Data URI error: {}", e),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// In-memory RGBA8 raster (straight alpha).
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Create a surface from a raw RGBA byte buffer.
    ///
    /// The buffer length must be exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SurfaceError> {
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        let image = RgbaImage::from_raw(width, height, pixels)
            .ok_or(SurfaceError::BufferSize { expected, actual })?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True when either dimension is zero (nothing to draw or encode)
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Scale down to fit a `max_dim` square, preserving aspect ratio.
    ///
    /// Uses the largest scale <= 1 that fits both dimensions; output sizes
    /// are floor-rounded (a 4000x2000 source with a 200 bound yields
    /// exactly 200x100). Sources already inside the bound are returned
    /// unscaled.
    pub fn scaled_to_fit(&self, max_dim: u32) -> Surface {
        if self.is_empty() {
            return self.clone();
        }
        let scale = (max_dim as f64 / self.width() as f64)
            .min(max_dim as f64 / self.height() as f64)
            .min(1.0);
        if scale >= 1.0 {
            return self.clone();
        }
        let new_w = ((self.width() as f64 * scale).floor() as u32).max(1);
        let new_h = ((self.height() as f64 * scale).floor() as u32).max(1);
        Surface {
            image: imageops::resize(&self.image, new_w, new_h, FilterType::CatmullRom),
        }
    }

    /// Source-over blit of `src` at (`left`, `top`) with a multiplicative
    /// opacity applied to the source alpha.
    ///
    /// Straight-alpha compositing: the source is weighted by its own alpha
    /// times `opacity` against the alpha accumulated in the canvas so far.
    /// Regions of `src` falling outside the canvas are clipped.
    pub fn blit_over(&mut self, src: &Surface, left: i32, top: i32, opacity: f32) {
        if src.is_empty() || self.is_empty() || opacity <= 0.0 {
            return;
        }
        let opacity = opacity.clamp(0.0, 1.0);

        let dst_w = self.width() as i64;
        let dst_h = self.height() as i64;

        // Overlap rectangle in destination coordinates
        let x0 = (left as i64).max(0);
        let y0 = (top as i64).max(0);
        let x1 = (left as i64 + src.width() as i64).min(dst_w);
        let y1 = (top as i64 + src.height() as i64).min(dst_h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for dy in y0..y1 {
            for dx in x0..x1 {
                let sx = (dx - left as i64) as u32;
                let sy = (dy - top as i64) as u32;
                let sp = src.image.get_pixel(sx, sy).0;
                let dp = self.image.get_pixel_mut(dx as u32, dy as u32);

                let sa = (sp[3] as f32 / 255.0) * opacity;
                if sa <= 0.0 {
                    continue;
                }
                let da = dp.0[3] as f32 / 255.0;
                let out_a = sa + da * (1.0 - sa);

                for c in 0..3 {
                    let sc = sp[c] as f32 / 255.0;
                    let dc = dp.0[c] as f32 / 255.0;
                    let out_c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
                    dp.0[c] = (out_c.clamp(0.0, 1.0) * 255.0).round() as u8;
                }
                dp.0[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
    }

    /// Encode as a lossless PNG data URI (`data:image/png;base64,...`)
    pub fn to_png_data_uri(&self) -> Result<String, SurfaceError> {
        let mut bytes: Vec<u8> = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                self.image.as_raw(),
                self.width(),
                self.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        Ok(format!("{}{}", PNG_DATA_URI_PREFIX, BASE64.encode(&bytes)))
    }

    /// Decode a PNG data URI produced by `to_png_data_uri`
    pub fn from_png_data_uri(uri: &str) -> Result<Surface, SurfaceError> {
        let payload = uri
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .ok_or_else(|| SurfaceError::DataUri("missing PNG data URI prefix".to_string()))?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| SurfaceError::DataUri(e.to_string()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| SurfaceError::DataUri(e.to_string()))?
            .to_rgba8();
        Ok(Surface { image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Surface {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Surface::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn test_from_rgba_validates_length() {
        assert!(Surface::from_rgba(2, 2, vec![0u8; 16]).is_ok());
        assert!(matches!(
            Surface::from_rgba(2, 2, vec![0u8; 15]),
            Err(SurfaceError::BufferSize { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn test_scaled_to_fit_width_bound() {
        // 4000x2000 into a 200 box: width-limited, exactly 200x100
        let surface = Surface::new(4000, 2000);
        let scaled = surface.scaled_to_fit(200);
        assert_eq!((scaled.width(), scaled.height()), (200, 100));
    }

    #[test]
    fn test_scaled_to_fit_height_bound() {
        let surface = Surface::new(1000, 4000);
        let scaled = surface.scaled_to_fit(200);
        assert_eq!((scaled.width(), scaled.height()), (50, 200));
    }

    #[test]
    fn test_scaled_to_fit_never_upscales() {
        let surface = Surface::new(100, 60);
        let scaled = surface.scaled_to_fit(200);
        assert_eq!((scaled.width(), scaled.height()), (100, 60));
    }

    #[test]
    fn test_scaled_to_fit_clamps_to_one_pixel() {
        let surface = Surface::new(1, 10_000);
        let scaled = surface.scaled_to_fit(200);
        assert_eq!((scaled.width(), scaled.height()), (1, 200));
    }

    #[test]
    fn test_blit_over_full_opacity() {
        let mut canvas = Surface::new(4, 4);
        let red = solid(2, 2, [255, 0, 0, 255]);
        canvas.blit_over(&red, 1, 1, 1.0);

        assert_eq!(canvas.image.get_pixel(1, 1).0, [255, 0, 0, 255]);
        // Outside the blit rectangle stays transparent
        assert_eq!(canvas.image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(canvas.image.get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_blit_over_applies_opacity_to_alpha() {
        let mut canvas = Surface::new(1, 1);
        let red = solid(1, 1, [255, 0, 0, 255]);
        canvas.blit_over(&red, 0, 0, 0.5);

        let px = canvas.image.get_pixel(0, 0).0;
        // Straight alpha: color survives, coverage is halved
        assert_eq!(px[0], 255);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn test_blit_over_clips_negative_offsets() {
        let mut canvas = Surface::new(2, 2);
        let red = solid(4, 4, [255, 0, 0, 255]);
        canvas.blit_over(&red, -3, -3, 1.0);
        // Only the source's bottom-right pixel lands on the canvas origin
        assert_eq!(canvas.image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_blit_over_fully_off_canvas_is_noop() {
        let mut canvas = Surface::new(2, 2);
        let before = canvas.clone();
        let red = solid(2, 2, [255, 0, 0, 255]);
        canvas.blit_over(&red, 10, 10, 1.0);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_png_data_uri_round_trip() {
        let src = solid(2, 1, [10, 20, 30, 255]);
        let uri = src.to_png_data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let decoded = Surface::from_png_data_uri(&uri).unwrap();
        assert_eq!(decoded, src);
    }
}
