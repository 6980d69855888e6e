//! Coordinate mapping between pointer, display and native image space.
//!
//! Three coordinate spaces are involved while editing:
//!
//! - **Viewport space**: raw `client_x`/`client_y` values from pointer events
//! - **Surface space**: relative to the top-left corner of the displayed image
//!   box, in display pixels. The annotation raster lives here.
//! - **Native space**: pixels of the actual image data, independent of how
//!   large it is drawn on screen.
//!
//! Mouse and touch events are normalized to [`PointerSample`] so everything
//! downstream handles both the same way.

use serde::{Deserialize, Serialize};

use crate::raster::Size;

/// A single pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A pointer event as delivered by the platform, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// A mouse (or pen) event with a single position.
    Mouse { client_x: f64, client_y: f64 },
    /// A touch event carrying every active contact point.
    Touch { touches: Vec<(f64, f64)> },
}

/// On-screen box of an element, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Convert a pointer event to surface space.
///
/// Returns one sample per active contact: exactly one for mouse events, and
/// zero or more for touch events (in the order the platform reported them).
pub fn to_surface_space(event: &PointerEvent, surface: &BoundingBox) -> Vec<PointerSample> {
    match event {
        PointerEvent::Mouse { client_x, client_y } => {
            vec![PointerSample::new(
                client_x - surface.left,
                client_y - surface.top,
            )]
        }
        PointerEvent::Touch { touches } => touches
            .iter()
            .map(|&(x, y)| PointerSample::new(x - surface.left, y - surface.top))
            .collect(),
    }
}

/// Convert a pointer event to surface space, keeping only the primary contact.
pub fn primary_sample(event: &PointerEvent, surface: &BoundingBox) -> Option<PointerSample> {
    to_surface_space(event, surface).into_iter().next()
}

/// Map a display-space point to native image pixels.
///
/// Each axis is scaled independently, so a display box whose aspect ratio
/// differs from the native raster still maps its corners onto the native
/// corners. A zero display dimension maps that axis to 0.
pub fn to_native_space(point: PointerSample, display: Size, native: Size) -> PointerSample {
    let (sx, sy) = scale_factors(display, native);
    PointerSample::new(point.x * sx, point.y * sy)
}

/// Per-axis scale factors from `display` to `native`.
pub fn scale_factors(display: Size, native: Size) -> (f64, f64) {
    let sx = if display.width == 0 {
        0.0
    } else {
        native.width as f64 / display.width as f64
    };
    let sy = if display.height == 0 {
        0.0
    } else {
        native.height as f64 / display.height as f64
    };
    (sx, sy)
}

/// Euclidean distance between two samples.
#[inline]
pub fn distance(a: PointerSample, b: PointerSample) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Compute the displayed box of an image shown "contain"-fitted in a viewport.
///
/// The image is scaled (up or down) to the largest size that fits entirely
/// within `viewport` while preserving its aspect ratio. Both output
/// dimensions are at least 1 when the inputs are non-empty.
///
/// Units are whatever `viewport` is given in (CSS pixels for the browser
/// editor); no device pixel ratio is applied.
pub fn fit_within(native: Size, viewport: Size) -> Size {
    if native.is_empty() || viewport.is_empty() {
        return Size::default();
    }

    let scale_x = viewport.width as f64 / native.width as f64;
    let scale_y = viewport.height as f64 / native.height as f64;
    let scale = scale_x.min(scale_y);

    let width = ((native.width as f64 * scale).round() as u32).clamp(1, viewport.width);
    let height = ((native.height as f64 * scale).round() as u32).clamp(1, viewport.height);
    Size::new(width, height)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
