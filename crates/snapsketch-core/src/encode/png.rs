//! PNG encoding using the `image` crate's encoder.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};
use crate::raster::RasterImage;

/// Encode a raster to PNG bytes.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let mut buffer = Cursor::new(Vec::new());

    PngEncoder::new(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}
