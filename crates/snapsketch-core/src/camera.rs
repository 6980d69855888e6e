//! Camera collaborator interface.
//!
//! The engine never talks to camera hardware directly. Platforms implement
//! [`CameraSource`] (browser `getUserMedia`, a native capture API, or a test
//! double) and the editor pulls frames and capabilities through it.

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::raster::RasterImage;
use crate::zoom::ZoomRange;

/// Which way the requested camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front ("selfie") camera
    User,
    /// Rear camera
    #[default]
    Environment,
}

impl Facing {
    /// The opposite camera.
    pub fn flipped(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }
}

/// What an opened camera stream supports.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraCapabilities {
    /// Optical/software zoom range, if the device reports one
    pub zoom: Option<ZoomRange>,
    /// Zoom the track is currently using (`getSettings().zoom` in browsers)
    #[serde(default)]
    pub current_zoom: Option<f64>,
}

/// Something that accepts zoom requests.
///
/// Applying is best-effort: the device may reject any value.
pub trait ZoomDevice {
    fn apply_zoom(&mut self, value: f64) -> Result<(), DeviceError>;
}

/// A live camera stream.
pub trait CameraSource: ZoomDevice {
    /// Open (or reopen) the stream for the given facing.
    fn open(&mut self, facing: Facing) -> Result<(), DeviceError>;

    /// Grab the frame currently shown in the live preview.
    fn current_frame(&mut self) -> Result<RasterImage, DeviceError>;

    /// Capabilities of the opened stream.
    fn capabilities(&self) -> CameraCapabilities;
}
