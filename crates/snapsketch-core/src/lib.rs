//! Snapsketch Core - capture, crop and annotate editing engine
//!
//! This crate provides the platform-independent part of Snapsketch: the
//! capture → crop → draw state machine, the freehand annotation layer with
//! bounded undo/redo, pinch-to-zoom for the camera preview, coordinate
//! mapping between display and native resolution, and export compositing.
//!
//! Camera access, the crop UI and clipboard/share/download are collaborators
//! behind the [`CameraSource`], [`CropWidget`] and [`ExportSink`] traits.

pub mod annotation;
pub mod camera;
pub mod config;
pub mod crop;
pub mod editor;
pub mod encode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod raster;
pub mod zoom;

pub use annotation::{AnnotationSurface, HistorySnapshot, StrokeColor};
pub use camera::{CameraCapabilities, CameraSource, Facing, ZoomDevice};
pub use config::{EditorConfig, ExportConfig, ExportFormat};
pub use crop::{apply_crop, CropRegion, CropWidget, RegionCropper};
pub use editor::{Editor, EditorState, Mode};
pub use error::{DeviceError, EditorError, ExportError, ExtractionError};
pub use export::{EncodedImage, ExportOutcome, ExportRequest, ExportSink, ShareOutcome};
pub use geometry::{BoundingBox, PointerEvent, PointerSample};
pub use history::HistoryStack;
pub use raster::{RasterImage, Size};
pub use zoom::{ZoomGestureController, ZoomRange};
