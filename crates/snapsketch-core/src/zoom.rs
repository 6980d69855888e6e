//! Pinch-to-zoom for the live camera preview.
//!
//! The controller watches the set of active pointers. When a second pointer
//! lands it snapshots the finger distance and the current zoom; while both
//! stay down, the zoom follows the ratio of the current distance to the
//! initial one, clamped to the device's range.
//!
//! Zoom changes smaller than the hysteresis threshold are dropped so the
//! camera isn't asked to re-zoom on every pointer-move frame.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::camera::ZoomDevice;
use crate::config::DEFAULT_ZOOM_HYSTERESIS;
use crate::geometry::{distance, PointerSample};

/// Zoom range reported by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ZoomRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// A range with `max <= min` (or non-finite bounds) can't be zoomed.
    pub fn is_usable(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Snapshot taken when the second pointer lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    /// Distance between the first two pointers at gesture start.
    pub initial_distance: f64,
    /// Applied zoom at gesture start.
    pub initial_zoom: f64,
}

/// Turns two-pointer gestures into camera zoom requests.
#[derive(Debug, Clone)]
pub struct ZoomGestureController {
    range: Option<ZoomRange>,
    current_zoom: f64,
    hysteresis: f64,
    pinch: Option<PinchState>,
}

impl Default for ZoomGestureController {
    fn default() -> Self {
        Self::new(None, DEFAULT_ZOOM_HYSTERESIS)
    }
}

impl ZoomGestureController {
    /// Create a controller for a device reporting `range`.
    ///
    /// With no range (or an unusable one) the controller is inert: gestures
    /// are tracked but zoom is never applied.
    pub fn new(range: Option<ZoomRange>, hysteresis: f64) -> Self {
        let range = range.filter(ZoomRange::is_usable);
        let current_zoom = range.map_or(1.0, |r| r.min);
        Self {
            range,
            current_zoom,
            hysteresis,
            pinch: None,
        }
    }

    /// Replace the device range (e.g. after switching cameras).
    ///
    /// Resets the current zoom to the range minimum and cancels any gesture.
    pub fn set_range(&mut self, range: Option<ZoomRange>) {
        *self = Self::new(range, self.hysteresis);
    }

    /// Feed the current set of active pointers.
    ///
    /// Returns the zoom value applied to `device`, if any.
    pub fn update(
        &mut self,
        pointers: &[PointerSample],
        device: &mut dyn ZoomDevice,
    ) -> Option<f64> {
        let [first, second, ..] = pointers else {
            if self.pinch.take().is_some() {
                debug!("Pinch ended");
            }
            return None;
        };

        let current_distance = distance(*first, *second);

        let Some(pinch) = self.pinch else {
            self.pinch = Some(PinchState {
                initial_distance: current_distance,
                initial_zoom: self.current_zoom,
            });
            debug!(
                "Pinch started at distance {:.1}, zoom {:.2}",
                current_distance, self.current_zoom
            );
            return None;
        };

        let candidate = self.candidate_zoom(&pinch, current_distance)?;
        if (candidate - self.current_zoom).abs() <= self.hysteresis {
            return None;
        }

        match device.apply_zoom(candidate) {
            Ok(()) => {
                self.current_zoom = candidate;
                Some(candidate)
            }
            Err(e) => {
                warn!("Failed to apply zoom {:.2}: {}", candidate, e);
                None
            }
        }
    }

    /// Zoom the gesture asks for, clamped to the device range.
    ///
    /// `None` when the controller is inert or the gesture started with both
    /// pointers on the same spot.
    pub fn candidate_zoom(&self, pinch: &PinchState, current_distance: f64) -> Option<f64> {
        let range = self.range?;
        if pinch.initial_distance <= f64::EPSILON {
            return None;
        }
        let scale = current_distance / pinch.initial_distance;
        Some(range.clamp(pinch.initial_zoom * scale))
    }

    /// Adopt the zoom the device is actually using.
    ///
    /// The value is clamped into the range. Ignored while inert or when not
    /// finite. Cancels any in-progress gesture.
    pub fn sync_current(&mut self, value: f64) {
        let Some(range) = self.range else {
            return;
        };
        if !value.is_finite() {
            return;
        }
        self.current_zoom = range.clamp(value);
        self.pinch = None;
    }

    /// Abandon any in-progress gesture.
    pub fn cancel(&mut self) {
        self.pinch = None;
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn is_inert(&self) -> bool {
        self.range.is_none()
    }

    pub fn pinch(&self) -> Option<&PinchState> {
        self.pinch.as_ref()
    }

    pub fn current_zoom(&self) -> f64 {
        self.current_zoom
    }

    pub fn range(&self) -> Option<ZoomRange> {
        self.range
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
