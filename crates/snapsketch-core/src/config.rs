//! Editor configuration.
//!
//! All fields have defaults, so a partial (or empty) config object is valid.
//! Values are clamped by [`EditorConfig::validated`] before use.

use serde::{Deserialize, Serialize};

use crate::annotation::StrokeColor;
use crate::history::DEFAULT_CAPACITY;

/// Default stroke width in display pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 5.0;

/// Minimum zoom change that is forwarded to the camera.
pub const DEFAULT_ZOOM_HYSTERESIS: f64 = 0.05;

/// Output format for exported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Encoded output format
    pub format: ExportFormat,
    /// JPEG quality (1-100), ignored for PNG
    pub jpeg_quality: u8,
    /// Prefix for generated download file names
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: 90,
            filename_prefix: "snapsketch".to_string(),
        }
    }
}

impl ExportConfig {
    /// File name used for downloads when the caller doesn't provide one.
    pub fn default_filename(&self) -> String {
        format!("{}.{}", self.filename_prefix, self.format.extension())
    }
}

/// Settings for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of annotation snapshots kept for undo
    pub history_capacity: usize,
    /// Stroke width in display pixels
    pub stroke_width: f32,
    /// Initial stroke color
    pub stroke_color: StrokeColor,
    /// Minimum zoom delta before a new zoom is applied to the camera
    pub zoom_hysteresis: f64,
    /// Export settings
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: StrokeColor::RED,
            zoom_hysteresis: DEFAULT_ZOOM_HYSTERESIS,
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Return a copy with every value forced into its usable range.
    pub fn validated(mut self) -> Self {
        self.history_capacity = self.history_capacity.clamp(1, 100);

        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            self.stroke_width = DEFAULT_STROKE_WIDTH;
        }

        if !self.zoom_hysteresis.is_finite() || self.zoom_hysteresis < 0.0 {
            self.zoom_hysteresis = DEFAULT_ZOOM_HYSTERESIS;
        }

        self.export.jpeg_quality = self.export.jpeg_quality.clamp(1, 100);
        if self.export.filename_prefix.trim().is_empty() {
            self.export.filename_prefix = ExportConfig::default().filename_prefix;
        }

        self
    }
}
