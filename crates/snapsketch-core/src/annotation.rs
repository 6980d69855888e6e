//! Freehand annotation layer.
//!
//! Strokes are rasterized immediately into a single RGBA layer sized to the
//! *displayed* image box. There is no stroke model: once a segment is drawn
//! it is just pixels. Undo works by restoring full-layer snapshots from a
//! [`HistoryStack`].
//!
//! The layer stays at display resolution while drawing and is only scaled up
//! to native resolution once, at export (see [`crate::export`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::geometry::PointerSample;
use crate::history::HistoryStack;
use crate::raster::Size;

/// Stroke color (straight, non-premultiplied RGBA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub const RED: StrokeColor = StrokeColor::rgb(255, 0, 0);
    pub const BLACK: StrokeColor = StrokeColor::rgb(0, 0, 0);
    pub const WHITE: StrokeColor = StrokeColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::RED
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
impl FromStr for StrokeColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(format!("Invalid color '{}': expected #rrggbb or #rrggbbaa", s));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("Invalid color '{}': bad hex digits", s))
        };

        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_string()
    }
}

/// Immutable full copy of the annotation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pixmap: Pixmap,
}

impl HistorySnapshot {
    fn capture(raster: &Pixmap) -> Self {
        Self {
            pixmap: raster.clone(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Premultiplied RGBA bytes.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }
}

/// The drawable annotation layer of the Draw state.
#[derive(Debug)]
pub struct AnnotationSurface {
    raster: Pixmap,
    history: HistoryStack<HistorySnapshot>,
    color: StrokeColor,
    stroke_width: f32,
    /// Running cursor of the active stroke
    pen: Option<PointerSample>,
}

impl AnnotationSurface {
    /// Create an empty surface for a displayed box of `display` pixels.
    ///
    /// The history receives one baseline snapshot of the empty layer, so the
    /// first stroke can always be undone.
    pub fn new(display: Size, config: &EditorConfig) -> Result<Self, EditorError> {
        let raster = allocate(display)?;
        let mut history = HistoryStack::new(config.history_capacity);
        history.push(HistorySnapshot::capture(&raster));

        Ok(Self {
            raster,
            history,
            color: config.stroke_color,
            stroke_width: config.stroke_width,
            pen: None,
        })
    }

    /// Start a stroke at `point` (surface space).
    ///
    /// Nothing is drawn until the stroke is extended. Starting a new stroke
    /// while one is active abandons the old cursor without a history entry.
    pub fn begin_stroke(&mut self, point: PointerSample) {
        self.pen = Some(point);
    }

    /// Draw a segment from the running cursor to `point`.
    ///
    /// Each segment starts exactly where the previous one ended; round caps
    /// and joins hide the seams between them. No-op without an active stroke.
    pub fn extend_stroke(&mut self, point: PointerSample) {
        let Some(from) = self.pen else {
            return;
        };

        if from != point {
            self.draw_segment(from, point);
        }
        self.pen = Some(point);
    }

    /// Finish the active stroke and record a history snapshot.
    ///
    /// A stroke that was never extended (a tap) still records an entry.
    /// Returns whether a stroke was active.
    pub fn end_stroke(&mut self) -> bool {
        if self.pen.take().is_none() {
            return false;
        }
        self.history.push(HistorySnapshot::capture(&self.raster));
        true
    }

    pub fn is_stroking(&self) -> bool {
        self.pen.is_some()
    }

    /// Change the color used by subsequent strokes.
    pub fn set_color(&mut self, color: StrokeColor) {
        self.color = color;
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    /// Reallocate the layer for a new displayed box.
    ///
    /// Existing pixels are discarded and any active stroke is dropped.
    /// History is kept; snapshots taken at the old size are scaled to fit
    /// when restored.
    pub fn resize_to_display(&mut self, display: Size) -> Result<(), EditorError> {
        if display == self.display_size() {
            return Ok(());
        }
        self.raster = allocate(display)?;
        self.pen = None;
        Ok(())
    }

    /// Erase all strokes as a single undoable step.
    pub fn clear(&mut self) {
        self.pen = None;
        self.raster.fill(Color::TRANSPARENT);
        self.history.push(HistorySnapshot::capture(&self.raster));
    }

    /// Restore the previous snapshot. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        self.pen = None;
        match self.history.undo() {
            Some(snapshot) => {
                restore(&mut self.raster, snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-apply the next snapshot. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        self.pen = None;
        match self.history.redo() {
            Some(snapshot) => {
                restore(&mut self.raster, snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryStack<HistorySnapshot> {
        &self.history
    }

    /// The annotation layer (premultiplied RGBA at display resolution).
    pub fn raster(&self) -> &Pixmap {
        &self.raster
    }

    pub fn display_size(&self) -> Size {
        Size::new(self.raster.width(), self.raster.height())
    }

    fn draw_segment(&mut self, from: PointerSample, to: PointerSample) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(self.color.r, self.color.g, self.color.b, self.color.a);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: self.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        self.raster
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

fn allocate(display: Size) -> Result<Pixmap, EditorError> {
    Pixmap::new(display.width, display.height).ok_or(EditorError::InvalidDisplaySize {
        width: display.width,
        height: display.height,
    })
}

/// Copy a snapshot into the layer, scaling it if the layer was resized since.
fn restore(raster: &mut Pixmap, snapshot: &HistorySnapshot) {
    if snapshot.pixmap.width() == raster.width() && snapshot.pixmap.height() == raster.height() {
        raster.data_mut().copy_from_slice(snapshot.pixmap.data());
        return;
    }

    let sx = raster.width() as f32 / snapshot.pixmap.width() as f32;
    let sy = raster.height() as f32 / snapshot.pixmap.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };

    raster.fill(Color::TRANSPARENT);
    raster.draw_pixmap(
        0,
        0,
        snapshot.pixmap.as_ref(),
        &paint,
        Transform::from_scale(sx, sy),
        None,
    );
}


// ============================================================================
// Property-Based Tests
// ============================================================================
