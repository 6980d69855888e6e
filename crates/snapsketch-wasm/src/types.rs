//! WASM-compatible wrapper types for image data.

use snapsketch_core::RasterImage;
use wasm_bindgen::prelude::*;

/// An RGB image handed across the JS boundary.
///
/// The pixel data lives in WASM memory; `pixels()` copies it out as a
/// `Uint8Array`, and `rgba()` produces a buffer ready for `ImageData`.
#[wasm_bindgen]
pub struct JsRasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRasterImage {
    /// Create an image from RGB pixel data (3 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRasterImage {
        JsRasterImage {
            width,
            height,
            pixels,
        }
    }

    /// Create an image from canvas `ImageData` bytes (RGBA), dropping alpha.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<JsRasterImage, JsValue> {
        RasterImage::from_rgba(width, height, rgba)
            .map(Self::from_raster)
            .ok_or_else(|| {
                JsValue::from_str(&format!(
                    "RGBA buffer is {} bytes, expected {}",
                    rgba.len(),
                    width as usize * height as usize * 4
                ))
            })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the RGB pixel buffer.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGB pixel data as a Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Opaque RGBA pixel data, suitable for `new ImageData(...)`.
    pub fn rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for px in self.pixels.chunks_exact(3) {
            out.extend_from_slice(px);
            out.push(255);
        }
        out
    }
}

impl JsRasterImage {
    pub(crate) fn from_raster(img: RasterImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core RasterImage (clones the pixel data).
    pub(crate) fn to_raster(&self) -> RasterImage {
        RasterImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}
