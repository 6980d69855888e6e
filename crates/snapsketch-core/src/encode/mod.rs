//! Encoding of exported rasters.
//!
//! Exports are encoded once, right before they are handed to the clipboard,
//! share sheet or download target. PNG is lossless and the default; JPEG is
//! available for smaller files.

mod jpeg;
mod png;

use thiserror::Error;

use crate::config::ExportFormat;
use crate::raster::RasterImage;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

/// Errors that can occur while encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed { format: &'static str, reason: String },
}

/// Encode a raster in the given format.
pub fn encode(image: &RasterImage, format: ExportFormat, jpeg_quality: u8) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(image),
        ExportFormat::Jpeg => encode_jpeg(image, jpeg_quality),
    }
}

/// Check that an RGB buffer is non-empty and matches its dimensions.
fn validate(image: &RasterImage) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    Ok(())
}
