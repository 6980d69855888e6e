//! Cropping: the crop widget interface and a built-in implementation.
//!
//! The editor treats the crop widget as a collaborator: it attaches an image,
//! later asks for the cropped raster, and detaches. Any UI can sit behind
//! [`CropWidget`]; [`RegionCropper`] is a headless implementation driven by a
//! normalized [`CropRegion`].
//!
//! # Coordinate System
//!
//! - (0.0, 0.0) = top-left corner
//! - (1.0, 1.0) = bottom-right corner
//! - width/height are relative to the attached image's dimensions

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::raster::RasterImage;

/// A crop-rectangle capability.
pub trait CropWidget {
    /// Start cropping `image`. Replaces any previously attached image.
    fn attach(&mut self, image: &RasterImage);

    /// Release the attached image and any resources tied to it.
    fn detach(&mut self);

    /// Produce the cropped raster at native resolution.
    ///
    /// Fails with [`ExtractionError::Detached`] when nothing is attached.
    fn extract(&mut self) -> Result<RasterImage, ExtractionError>;

    fn is_attached(&self) -> bool;
}

/// Normalized crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for CropRegion {
    fn default() -> Self {
        Self::FULL
    }
}

impl CropRegion {
    /// The whole image.
    pub const FULL: CropRegion = CropRegion {
        left: 0.0,
        top: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_full(&self) -> bool {
        self.left <= 0.0 && self.top <= 0.0 && self.width >= 1.0 && self.height >= 1.0
    }
}

/// Headless crop widget holding the attached image and a region.
///
/// The region survives re-attachment so a UI can keep its last rectangle,
/// but callers usually [`reset_region`](Self::reset_region) on attach.
#[derive(Debug, Clone, Default)]
pub struct RegionCropper {
    source: Option<RasterImage>,
    region: CropRegion,
}

impl RegionCropper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_region(&mut self, region: CropRegion) {
        self.region = region;
    }

    pub fn reset_region(&mut self) {
        self.region = CropRegion::FULL;
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn source(&self) -> Option<&RasterImage> {
        self.source.as_ref()
    }
}

impl CropWidget for RegionCropper {
    fn attach(&mut self, image: &RasterImage) {
        self.source = Some(image.clone());
    }

    fn detach(&mut self) {
        self.source = None;
    }

    fn extract(&mut self) -> Result<RasterImage, ExtractionError> {
        let source = self.source.as_ref().ok_or(ExtractionError::Detached)?;
        if source.is_empty() {
            return Err(ExtractionError::Failed("attached image is empty".to_string()));
        }
        if !source.has_valid_buffer() {
            return Err(ExtractionError::Failed(format!(
                "attached image buffer is {} bytes, expected {}",
                source.pixels.len(),
                source.expected_len()
            )));
        }
        Ok(apply_crop(source, self.region))
    }

    fn is_attached(&self) -> bool {
        self.source.is_some()
    }
}

/// Crop an image to a normalized region.
///
/// # Behavior
///
/// - Coordinates extending beyond the image are clamped
/// - Minimum output dimension is 1x1 pixels
/// - A full region returns a copy of the original image, as does an empty
///   image or one whose buffer doesn't match its dimensions
pub fn apply_crop(image: &RasterImage, region: CropRegion) -> RasterImage {
    // Fast path: full crop returns a clone
    if region.is_full() || image.is_empty() || !image.has_valid_buffer() {
        return image.clone();
    }

    // Convert normalized coordinates to pixel coordinates
    let src_w = image.width as f64;
    let src_h = image.height as f64;

    let px_left = (region.left.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_top = (region.top.clamp(0.0, 1.0) * src_h).round() as u32;
    let px_width = (region.width.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_height = (region.height.clamp(0.0, 1.0) * src_h).round() as u32;

    // Clamp to image bounds
    let px_left = px_left.min(image.width.saturating_sub(1));
    let px_top = px_top.min(image.height.saturating_sub(1));
    let px_right = (px_left + px_width).min(image.width);
    let px_bottom = (px_top + px_height).min(image.height);

    let out_width = px_right.saturating_sub(px_left).max(1);
    let out_height = px_bottom.saturating_sub(px_top).max(1);

    let row_bytes = out_width as usize * 3;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    for y in px_top..px_top + out_height {
        let start = (y as usize * image.width as usize + px_left as usize) * 3;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    RasterImage::new(out_width, out_height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
