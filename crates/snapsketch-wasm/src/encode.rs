//! Image encoding WASM bindings.
//!
//! Most callers export through `JsEditor::export_encoded`, which already
//! encodes in the configured format. These functions cover encoding an
//! arbitrary `JsRasterImage`, e.g. the raw capture.

use crate::types::JsRasterImage;
use snapsketch_core::encode;
use wasm_bindgen::prelude::*;

/// Encode an image to JPEG bytes.
///
/// `quality` is clamped to 1-100 (recommended: 90).
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsRasterImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(&image.to_raster(), quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode an image to PNG bytes.
#[wasm_bindgen]
pub fn encode_png(image: &JsRasterImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&image.to_raster()).map_err(|e| JsValue::from_str(&e.to_string()))
}
