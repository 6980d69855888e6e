//! Core raster types shared by the editing engine.
//!
//! Captured frames and cropped results are stored as tightly packed RGB
//! buffers. The annotation layer uses `tiny_skia::Pixmap` instead, since it
//! needs an alpha channel; see [`crate::annotation`].

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a raster or an on-screen box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An immutable RGB raster.
///
/// Used for camera captures (the "base image") and crop results. Once an
/// image has been handed to the editor it is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a new RasterImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            rgb_len(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster filled with a single RGB color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(rgb_len(width, height))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster from RGBA data, dropping the alpha channel.
    ///
    /// This is the layout browsers hand out for video frames drawn to a
    /// canvas. Returns `None` if the buffer length doesn't match.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        let mut pixels = Vec::with_capacity(rgb_len(width, height));
        for px in rgba.chunks_exact(4) {
            pixels.extend_from_slice(&px[..3]);
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a RasterImage from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for encoding.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Native pixel dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// RGB value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.pixels.get(idx..idx + 3)?;
        Some([px[0], px[1], px[2]])
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Buffer length the dimensions call for.
    pub fn expected_len(&self) -> usize {
        rgb_len(self.width, self.height)
    }

    /// Whether `pixels` holds exactly `width * height` RGB triples.
    pub fn has_valid_buffer(&self) -> bool {
        self.pixels.len() == self.expected_len()
    }
}

/// Byte length of a packed RGB buffer, computed in `usize`.
#[inline]
pub(crate) fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}
