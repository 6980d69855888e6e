//! Error types for the editing engine.
//!
//! Each collaborator boundary has its own error enum. [`EditorError`] wraps
//! the ones that can abort a state transition.

use thiserror::Error;

use crate::encode::EncodeError;

/// Errors reported by the camera source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The user (or platform) refused camera access.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No camera matching the request is available.
    #[error("No camera device available")]
    NotFound,

    /// The stream has not been opened yet.
    #[error("Camera stream is not open")]
    NotOpen,

    /// The device rejected a request (e.g. a zoom constraint).
    #[error("Camera rejected request: {0}")]
    Rejected(String),
}

/// Errors reported by the crop widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// `extract` was called while no image is attached.
    #[error("Crop widget is not attached to an image")]
    Detached,

    /// The widget failed to produce a raster.
    #[error("Crop extraction failed: {0}")]
    Failed(String),
}

/// Errors that can occur while exporting the edited image.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The editor has no image (camera is still live).
    #[error("Nothing to export: no image has been captured")]
    NothingToExport,

    /// The crop widget could not produce the export raster.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Compositing the annotation layer failed.
    #[error("Compositing failed: {0}")]
    Composite(String),

    /// Encoding the final raster failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The clipboard, share or download target failed.
    #[error("Export target failed: {0}")]
    Sink(String),
}

/// Top-level error for editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// The displayed box has a zero dimension, so no annotation raster can
    /// be allocated for it.
    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplaySize { width: u32, height: u32 },

    /// A captured frame had no pixels.
    #[error("Captured frame is empty")]
    EmptyFrame,

    /// A captured frame's pixel buffer doesn't match its dimensions.
    #[error("Captured frame buffer is {actual} bytes, expected {expected}")]
    InvalidFrame { expected: usize, actual: usize },
}
