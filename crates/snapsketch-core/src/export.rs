//! Producing the final image and handing it to an export target.
//!
//! # Compositing
//!
//! In the Crop state the export is simply the crop widget's output. In the
//! Draw state the annotation layer (kept at display resolution while
//! drawing) is scaled up to the cropped image's native size and drawn over
//! it. Each axis is scaled independently so the annotation lines up with the
//! image even if the displayed box was letterboxed.

use log::{debug, info};
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::config::{ExportConfig, ExportFormat};
use crate::crop::CropWidget;
use crate::editor::EditorState;
use crate::encode;
use crate::error::ExportError;
use crate::geometry::scale_factors;
use crate::raster::{RasterImage, Size};

/// An encoded export ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Result of a share-sheet request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user dismissed the share sheet. Not an error.
    Cancelled,
}

/// Platform export targets.
pub trait ExportSink {
    fn write_to_clipboard(&mut self, image: &EncodedImage) -> Result<(), ExportError>;

    fn share(&mut self, image: &EncodedImage) -> Result<ShareOutcome, ExportError>;

    fn download_as(&mut self, image: &EncodedImage, filename: &str) -> Result<(), ExportError>;
}

/// Where the export should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportRequest {
    Clipboard,
    Share,
    /// Save as a file; `None` uses the configured default name.
    Download { filename: Option<String> },
}

/// What happened to a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Copied,
    Shared,
    ShareCancelled,
    Downloaded { filename: String },
}

/// Produce the export raster for the current state.
///
/// Never changes the state. In the Crop state the widget stays attached.
pub fn compose(
    state: &EditorState,
    widget: &mut dyn CropWidget,
) -> Result<RasterImage, ExportError> {
    match state {
        EditorState::Idle => Err(ExportError::NothingToExport),
        EditorState::Crop { .. } => Ok(widget.extract()?),
        EditorState::Draw {
            cropped_image,
            surface,
            ..
        } => composite(cropped_image, surface.raster()),
    }
}

/// Draw `annotation` over `base`, scaled to `base`'s native size.
pub fn composite(base: &RasterImage, annotation: &Pixmap) -> Result<RasterImage, ExportError> {
    let expected = (base.width as usize) * (base.height as usize) * 3;
    if base.pixels.len() != expected {
        return Err(ExportError::Composite(format!(
            "base image buffer is {} bytes, expected {}",
            base.pixels.len(),
            expected
        )));
    }

    let mut canvas = Pixmap::new(base.width, base.height).ok_or_else(|| {
        ExportError::Composite(format!(
            "cannot allocate {}x{} output",
            base.width, base.height
        ))
    })?;

    for (dst, src) in canvas
        .data_mut()
        .chunks_exact_mut(4)
        .zip(base.pixels.chunks_exact(3))
    {
        dst[..3].copy_from_slice(src);
        dst[3] = 255;
    }

    let display = Size::new(annotation.width(), annotation.height());
    let (sx, sy) = scale_factors(display, base.size());
    debug!(
        "Compositing {}x{} annotation onto {}x{} image (scale {:.3}, {:.3})",
        display.width, display.height, base.width, base.height, sx, sy
    );

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    canvas.draw_pixmap(
        0,
        0,
        annotation.as_ref(),
        &paint,
        Transform::from_scale(sx as f32, sy as f32),
        None,
    );

    // The canvas is fully opaque, so premultiplied == straight RGB.
    let mut pixels = Vec::with_capacity(expected);
    for px in canvas.data().chunks_exact(4) {
        pixels.extend_from_slice(&px[..3]);
    }

    Ok(RasterImage::new(base.width, base.height, pixels))
}

/// Encode `image` in the configured export format.
pub fn encode_for_export(
    image: &RasterImage,
    config: &ExportConfig,
) -> Result<EncodedImage, ExportError> {
    Ok(EncodedImage {
        bytes: encode::encode(image, config.format, config.jpeg_quality)?,
        format: config.format,
        width: image.width,
        height: image.height,
    })
}

/// Encode `image` per `config` and deliver it to `sink`.
pub fn deliver(
    image: &RasterImage,
    request: &ExportRequest,
    config: &ExportConfig,
    sink: &mut dyn ExportSink,
) -> Result<ExportOutcome, ExportError> {
    let encoded = encode_for_export(image, config)?;

    let outcome = match request {
        ExportRequest::Clipboard => {
            sink.write_to_clipboard(&encoded)?;
            ExportOutcome::Copied
        }
        ExportRequest::Share => match sink.share(&encoded)? {
            ShareOutcome::Shared => ExportOutcome::Shared,
            ShareOutcome::Cancelled => ExportOutcome::ShareCancelled,
        },
        ExportRequest::Download { filename } => {
            let filename = filename
                .clone()
                .unwrap_or_else(|| config.default_filename());
            sink.download_as(&encoded, &filename)?;
            ExportOutcome::Downloaded { filename }
        }
    };

    info!(
        "Exported {}x{} {} ({} bytes): {:?}",
        encoded.width,
        encoded.height,
        encoded.mime_type(),
        encoded.bytes.len(),
        outcome
    );
    Ok(outcome)
}
