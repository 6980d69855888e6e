//! JPEG encoding using the `image` crate's encoder.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};
use crate::raster::RasterImage;

/// Encode a raster to JPEG bytes.
///
/// `quality` is clamped to 1-100. 90 is a good default for photos with
/// annotations; lower values start to smear thin strokes.
pub fn encode_jpeg(image: &RasterImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());

    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_basic() {
        let img = RasterImage::filled(100, 100, [128, 128, 128]);
        let jpeg = encode_jpeg(&img, 90).unwrap();

        // SOI and EOI markers
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let img = RasterImage::filled(10, 10, [128, 128, 128]);
        assert!(encode_jpeg(&img, 0).is_ok());
        assert!(encode_jpeg(&img, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let img = RasterImage {
            width: 100,
            height: 100,
            pixels: vec![128u8; 99 * 100 * 3],
        };
        assert!(matches!(
            encode_jpeg(&img, 90),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }

    #[test]
    fn test_encode_jpeg_non_square() {
        assert!(encode_jpeg(&RasterImage::filled(200, 50, [0, 0, 0]), 90).is_ok());
        assert!(encode_jpeg(&RasterImage::filled(50, 200, [0, 0, 0]), 90).is_ok());
    }
}
