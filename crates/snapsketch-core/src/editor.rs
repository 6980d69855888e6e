//! The capture → crop → draw state machine.
//!
//! [`Editor`] owns everything a session needs: the current [`EditorState`],
//! the crop widget, the pinch-zoom controller and the configuration. All
//! operations are synchronous and run to completion; every trigger either
//! performs exactly one transition or is a logged no-op.
//!
//! # States
//!
//! ```text
//!            capture                confirm_draw
//!   Idle ─────────────▶ Crop ─────────────────────▶ Draw
//!    ▲                  │  ▲                         │
//!    │     retake       │  │ discard_to_crop         │
//!    ├──────────────────┘  └─────────────────────────┤
//!    │                  retake                       │
//!    └───────────────────────────────────────────────┘
//! ```
//!
//! Failed transitions leave the state untouched.

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationSurface, StrokeColor};
use crate::camera::{CameraSource, Facing, ZoomDevice};
use crate::config::EditorConfig;
use crate::crop::CropWidget;
use crate::error::{EditorError, ExportError};
use crate::export::{self, EncodedImage, ExportOutcome, ExportRequest, ExportSink};
use crate::geometry::{fit_within, PointerSample};
use crate::raster::{RasterImage, Size};
use crate::zoom::{ZoomGestureController, ZoomRange};

/// The editor's current mode and the data it owns.
#[derive(Debug, Default)]
pub enum EditorState {
    /// Camera preview is live; no image yet.
    #[default]
    Idle,
    /// A frame was captured and the crop widget is attached to it.
    Crop { base_image: RasterImage },
    /// The crop was applied and the annotation layer is active.
    Draw {
        /// Original capture, kept so the crop can be redone.
        base_image: RasterImage,
        cropped_image: RasterImage,
        surface: AnnotationSurface,
    },
}

impl EditorState {
    pub fn mode(&self) -> Mode {
        match self {
            EditorState::Idle => Mode::Idle,
            EditorState::Crop { .. } => Mode::Crop,
            EditorState::Draw { .. } => Mode::Draw,
        }
    }
}

/// Data-less view of [`EditorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Idle,
    Crop,
    Draw,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::Crop => "crop",
            Mode::Draw => "draw",
        };
        f.write_str(name)
    }
}

/// An editing session.
pub struct Editor<W: CropWidget> {
    state: EditorState,
    crop: W,
    zoom: ZoomGestureController,
    config: EditorConfig,
    facing: Facing,
}

impl<W: CropWidget> Editor<W> {
    /// Create an editor in the Idle state.
    pub fn new(crop: W, config: EditorConfig) -> Self {
        let config = config.validated();
        let zoom = ZoomGestureController::new(None, config.zoom_hysteresis);
        Self {
            state: EditorState::Idle,
            crop,
            zoom,
            config,
            facing: Facing::default(),
        }
    }

    // ------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------

    /// Open the camera and pick up its zoom capabilities.
    ///
    /// On failure the previous facing and zoom setup are kept.
    pub fn start_camera(
        &mut self,
        camera: &mut dyn CameraSource,
        facing: Facing,
    ) -> Result<(), EditorError> {
        camera.open(facing)?;

        let capabilities = camera.capabilities();
        self.set_zoom_range(capabilities.zoom, capabilities.current_zoom);
        self.facing = facing;
        info!(
            "Camera opened (facing {:?}, zoom {:?})",
            facing, capabilities.zoom
        );
        Ok(())
    }

    /// Configure zoom for a camera opened outside the editor.
    ///
    /// `current` is the zoom the track is using now; without it the
    /// controller starts at the range minimum.
    pub fn set_zoom_range(&mut self, range: Option<ZoomRange>, current: Option<f64>) {
        self.zoom.set_range(range);
        if let Some(current) = current {
            self.zoom.sync_current(current);
        }
    }

    /// Reopen the camera facing the other way.
    pub fn switch_camera(&mut self, camera: &mut dyn CameraSource) -> Result<(), EditorError> {
        self.start_camera(camera, self.facing.flipped())
    }

    /// Feed the active pointers over the live preview to the pinch-zoom
    /// controller. Only meaningful while Idle.
    ///
    /// Returns the zoom applied to `device`, if any.
    pub fn pointers_changed(
        &mut self,
        pointers: &[PointerSample],
        device: &mut dyn ZoomDevice,
    ) -> Option<f64> {
        if self.mode() != Mode::Idle {
            self.zoom.cancel();
            return None;
        }
        self.zoom.update(pointers, device)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// `Idle → Crop`: take `frame` as the base image.
    pub fn capture(&mut self, frame: RasterImage) -> Result<(), EditorError> {
        if !self.expect_mode(Mode::Idle, "capture") {
            return Ok(());
        }
        if frame.is_empty() {
            return Err(EditorError::EmptyFrame);
        }
        if !frame.has_valid_buffer() {
            return Err(EditorError::InvalidFrame {
                expected: frame.expected_len(),
                actual: frame.pixels.len(),
            });
        }

        self.zoom.cancel();
        self.crop.attach(&frame);
        info!("Captured {}x{} frame", frame.width, frame.height);
        self.state = EditorState::Crop { base_image: frame };
        Ok(())
    }

    /// `Idle → Crop` using the camera's current frame.
    pub fn capture_from(&mut self, camera: &mut dyn CameraSource) -> Result<(), EditorError> {
        if !self.expect_mode(Mode::Idle, "capture") {
            return Ok(());
        }
        let frame = camera.current_frame()?;
        self.capture(frame)
    }

    /// `Crop → Draw`: apply the crop and start annotating.
    ///
    /// `viewport` is the on-screen area the cropped image will be shown in;
    /// the annotation layer is sized to the image's fitted box within it.
    /// If extraction fails the editor stays in Crop with the widget attached.
    pub fn confirm_draw(&mut self, viewport: Size) -> Result<(), EditorError> {
        if !self.expect_mode(Mode::Crop, "confirm_draw") {
            return Ok(());
        }
        if viewport.is_empty() {
            return Err(EditorError::InvalidDisplaySize {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let cropped_image = self.crop.extract()?;
        let display = fit_within(cropped_image.size(), viewport);
        let surface = AnnotationSurface::new(display, &self.config)?;

        let base_image = match std::mem::take(&mut self.state) {
            EditorState::Crop { base_image } => base_image,
            other => {
                self.state = other;
                return Ok(());
            }
        };
        self.crop.detach();

        info!(
            "Entered draw mode: {}x{} image shown at {}x{}",
            cropped_image.width, cropped_image.height, display.width, display.height
        );
        self.state = EditorState::Draw {
            base_image,
            cropped_image,
            surface,
        };
        Ok(())
    }

    /// `Draw → Crop`: throw away the annotations and crop the original
    /// capture again.
    ///
    /// Annotation loss is irreversible, so this only happens when the user
    /// `confirmed` it. Returns whether the transition happened.
    pub fn discard_to_crop(&mut self, confirmed: bool) -> bool {
        if !self.expect_mode(Mode::Draw, "discard_to_crop") {
            return false;
        }
        if !confirmed {
            debug!("Discard to crop not confirmed; staying in draw mode");
            return false;
        }

        let base_image = match std::mem::take(&mut self.state) {
            EditorState::Draw { base_image, .. } => base_image,
            other => {
                self.state = other;
                return false;
            }
        };

        self.crop.attach(&base_image);
        info!("Discarded annotations; cropping original capture again");
        self.state = EditorState::Crop { base_image };
        true
    }

    /// `Crop | Draw → Idle`: drop everything and go back to the camera.
    pub fn retake(&mut self) -> bool {
        match self.state {
            EditorState::Idle => {
                debug!("Ignoring retake: already idle");
                return false;
            }
            EditorState::Crop { .. } => self.crop.detach(),
            EditorState::Draw { .. } => {}
        }

        self.state = EditorState::Idle;
        self.zoom.cancel();
        info!("Retake: back to camera");
        true
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Produce the final raster for the current state.
    pub fn export_image(&mut self) -> Result<RasterImage, ExportError> {
        export::compose(&self.state, &mut self.crop)
    }

    /// Produce and encode the final image.
    pub fn export_encoded(&mut self) -> Result<EncodedImage, ExportError> {
        let image = self.export_image()?;
        export::encode_for_export(&image, &self.config.export)
    }

    /// Export to a sink. The editor state is never changed, so a failed or
    /// cancelled export can simply be retried.
    pub fn export(
        &mut self,
        request: &ExportRequest,
        sink: &mut dyn ExportSink,
    ) -> Result<ExportOutcome, EditorError> {
        let image = self.export_image()?;
        Ok(export::deliver(&image, request, &self.config.export, sink)?)
    }

    // ------------------------------------------------------------------
    // Drawing (no-ops outside Draw)
    // ------------------------------------------------------------------

    pub fn begin_stroke(&mut self, point: PointerSample) {
        if let Some(surface) = self.surface_mut() {
            surface.begin_stroke(point);
        }
    }

    pub fn extend_stroke(&mut self, point: PointerSample) {
        if let Some(surface) = self.surface_mut() {
            surface.extend_stroke(point);
        }
    }

    /// Returns whether a stroke was finished (and recorded in history).
    pub fn end_stroke(&mut self) -> bool {
        self.surface_mut().is_some_and(|s| s.end_stroke())
    }

    /// Select the stroke color. Kept across Draw sessions.
    pub fn set_color(&mut self, color: StrokeColor) {
        self.config.stroke_color = color;
        if let Some(surface) = self.surface_mut() {
            surface.set_color(color);
        }
    }

    pub fn color(&self) -> StrokeColor {
        self.config.stroke_color
    }

    pub fn undo(&mut self) -> bool {
        self.surface_mut().is_some_and(|s| s.undo())
    }

    pub fn redo(&mut self) -> bool {
        self.surface_mut().is_some_and(|s| s.redo())
    }

    pub fn can_undo(&self) -> bool {
        self.surface().is_some_and(|s| s.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.surface().is_some_and(|s| s.can_redo())
    }

    /// Erase all annotations (undoable).
    pub fn clear_annotations(&mut self) {
        if let Some(surface) = self.surface_mut() {
            surface.clear();
        }
    }

    /// Re-fit the annotation layer after the viewport changed size.
    ///
    /// The layer's pixels are discarded if its size changes.
    pub fn resize_display(&mut self, viewport: Size) -> Result<(), EditorError> {
        let EditorState::Draw {
            cropped_image,
            surface,
            ..
        } = &mut self.state
        else {
            return Ok(());
        };

        let display = fit_within(cropped_image.size(), viewport);
        if display.is_empty() {
            return Err(EditorError::InvalidDisplaySize {
                width: viewport.width,
                height: viewport.height,
            });
        }
        surface.resize_to_display(display)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn zoom(&self) -> &ZoomGestureController {
        &self.zoom
    }

    pub fn crop_widget(&self) -> &W {
        &self.crop
    }

    pub fn crop_widget_mut(&mut self) -> &mut W {
        &mut self.crop
    }

    pub fn surface(&self) -> Option<&AnnotationSurface> {
        match &self.state {
            EditorState::Draw { surface, .. } => Some(surface),
            _ => None,
        }
    }

    /// Displayed size of the annotation layer, while drawing.
    pub fn display_size(&self) -> Option<Size> {
        self.surface().map(AnnotationSurface::display_size)
    }

    fn surface_mut(&mut self) -> Option<&mut AnnotationSurface> {
        match &mut self.state {
            EditorState::Draw { surface, .. } => Some(surface),
            _ => None,
        }
    }

    fn expect_mode(&self, mode: Mode, action: &str) -> bool {
        let current = self.mode();
        if current != mode {
            debug!("Ignoring {} in {} mode", action, current);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraCapabilities;
    use crate::crop::{CropRegion, RegionCropper};
    use crate::error::{DeviceError, ExtractionError};
    use crate::export::ShareOutcome;

    const GRAY: [u8; 3] = [128, 128, 128];

    struct FakeCamera {
        frame: RasterImage,
        opened: Option<Facing>,
        deny: bool,
        zoom: Option<ZoomRange>,
        current_zoom: Option<f64>,
        applied: Vec<f64>,
    }

    impl FakeCamera {
        fn new(width: u32, height: u32) -> Self {
            Self {
                frame: RasterImage::filled(width, height, GRAY),
                opened: None,
                deny: false,
                zoom: Some(ZoomRange::new(1.0, 5.0, 0.1)),
                current_zoom: None,
                applied: Vec::new(),
            }
        }
    }

    impl ZoomDevice for FakeCamera {
        fn apply_zoom(&mut self, value: f64) -> Result<(), DeviceError> {
            self.applied.push(value);
            Ok(())
        }
    }

    impl CameraSource for FakeCamera {
        fn open(&mut self, facing: Facing) -> Result<(), DeviceError> {
            if self.deny {
                return Err(DeviceError::PermissionDenied);
            }
            self.opened = Some(facing);
            Ok(())
        }

        fn current_frame(&mut self) -> Result<RasterImage, DeviceError> {
            if self.opened.is_none() {
                return Err(DeviceError::NotOpen);
            }
            Ok(self.frame.clone())
        }

        fn capabilities(&self) -> CameraCapabilities {
            CameraCapabilities {
                zoom: self.zoom,
                current_zoom: self.current_zoom,
            }
        }
    }

    /// Crop widget that fails on demand.
    #[derive(Default)]
    struct FlakyCropper {
        inner: RegionCropper,
        fail: bool,
        detach_calls: usize,
    }

    impl CropWidget for FlakyCropper {
        fn attach(&mut self, image: &RasterImage) {
            self.inner.attach(image);
        }

        fn detach(&mut self) {
            self.detach_calls += 1;
            self.inner.detach();
        }

        fn extract(&mut self) -> Result<RasterImage, ExtractionError> {
            if self.fail {
                return Err(ExtractionError::Failed("widget crashed".to_string()));
            }
            self.inner.extract()
        }

        fn is_attached(&self) -> bool {
            self.inner.is_attached()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        downloads: Vec<(EncodedImage, String)>,
        cancel_share: bool,
    }

    impl ExportSink for RecordingSink {
        fn write_to_clipboard(&mut self, _image: &EncodedImage) -> Result<(), ExportError> {
            Err(ExportError::Sink("clipboard denied".to_string()))
        }

        fn share(&mut self, _image: &EncodedImage) -> Result<ShareOutcome, ExportError> {
            if self.cancel_share {
                Ok(ShareOutcome::Cancelled)
            } else {
                Ok(ShareOutcome::Shared)
            }
        }

        fn download_as(&mut self, image: &EncodedImage, filename: &str) -> Result<(), ExportError> {
            self.downloads.push((image.clone(), filename.to_string()));
            Ok(())
        }
    }

    fn editor() -> Editor<FlakyCropper> {
        Editor::new(FlakyCropper::default(), EditorConfig::default())
    }

    fn draw_line(editor: &mut Editor<FlakyCropper>, from: (f64, f64), to: (f64, f64)) {
        editor.begin_stroke(PointerSample::new(from.0, from.1));
        editor.extend_stroke(PointerSample::new(to.0, to.1));
        editor.end_stroke();
    }

    /// Editor in Draw mode over a 200x100 gray capture shown at 100x50.
    fn drawing_editor() -> Editor<FlakyCropper> {
        let mut ed = editor();
        ed.capture(RasterImage::filled(200, 100, GRAY)).unwrap();
        ed.confirm_draw(Size::new(100, 100)).unwrap();
        ed
    }

    #[test]
    fn test_starts_idle() {
        let ed = editor();
        assert_eq!(ed.mode(), Mode::Idle);
        assert!(ed.surface().is_none());
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_capture_enters_crop_and_attaches() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(40, 30, GRAY)).unwrap();

        assert_eq!(ed.mode(), Mode::Crop);
        assert!(ed.crop_widget().is_attached());
    }

    #[test]
    fn test_capture_outside_idle_is_noop() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(40, 30, GRAY)).unwrap();
        ed.capture(RasterImage::filled(10, 10, [0, 0, 0])).unwrap();

        let EditorState::Crop { base_image } = ed.state() else {
            panic!("expected crop state");
        };
        assert_eq!(base_image.width, 40);
    }

    #[test]
    fn test_capture_empty_frame_rejected() {
        let mut ed = editor();
        let result = ed.capture(RasterImage::new(0, 0, vec![]));
        assert!(matches!(result, Err(EditorError::EmptyFrame)));
        assert_eq!(ed.mode(), Mode::Idle);
    }

    #[test]
    fn test_capture_rejects_short_buffer() {
        let mut ed = editor();
        let frame = RasterImage {
            width: 10,
            height: 10,
            pixels: vec![0; 3],
        };

        let result = ed.capture(frame);
        assert!(matches!(
            result,
            Err(EditorError::InvalidFrame {
                expected: 300,
                actual: 3
            })
        ));
        assert_eq!(ed.mode(), Mode::Idle);
        assert!(!ed.crop_widget().is_attached());

        // A cropped confirm has nothing to work on and must not panic
        ed.crop_widget_mut()
            .inner
            .set_region(CropRegion::new(0.0, 0.0, 0.5, 0.5));
        ed.confirm_draw(Size::new(100, 100)).unwrap();
        assert_eq!(ed.mode(), Mode::Idle);
    }

    #[test]
    fn test_capture_from_camera() {
        let mut ed = editor();
        let mut camera = FakeCamera::new(64, 48);
        ed.start_camera(&mut camera, Facing::Environment).unwrap();
        ed.capture_from(&mut camera).unwrap();

        assert_eq!(ed.mode(), Mode::Crop);
    }

    #[test]
    fn test_camera_denied_stays_idle() {
        let mut ed = editor();
        let mut camera = FakeCamera::new(64, 48);
        camera.deny = true;

        let result = ed.start_camera(&mut camera, Facing::User);
        assert!(matches!(
            result,
            Err(EditorError::Device(DeviceError::PermissionDenied))
        ));
        assert_eq!(ed.facing(), Facing::Environment);

        // Frame grab fails too since the stream never opened
        assert!(ed.capture_from(&mut camera).is_err());
        assert_eq!(ed.mode(), Mode::Idle);
    }

    #[test]
    fn test_start_camera_adopts_device_zoom() {
        let mut ed = editor();
        let mut camera = FakeCamera::new(8, 8);
        camera.current_zoom = Some(2.0);
        ed.start_camera(&mut camera, Facing::Environment).unwrap();
        assert_eq!(ed.zoom().current_zoom(), 2.0);

        // Pinch scales relative to the device's zoom
        let near = [PointerSample::new(0.0, 0.0), PointerSample::new(100.0, 0.0)];
        let far = [PointerSample::new(0.0, 0.0), PointerSample::new(150.0, 0.0)];
        ed.pointers_changed(&near, &mut camera);
        assert_eq!(ed.pointers_changed(&far, &mut camera), Some(3.0));
    }

    #[test]
    fn test_switch_camera_flips_facing() {
        let mut ed = editor();
        let mut camera = FakeCamera::new(8, 8);
        ed.start_camera(&mut camera, Facing::Environment).unwrap();
        ed.switch_camera(&mut camera).unwrap();
        assert_eq!(ed.facing(), Facing::User);
        assert_eq!(camera.opened, Some(Facing::User));
    }

    #[test]
    fn test_confirm_draw_sizes_surface_to_display() {
        let ed = drawing_editor();

        assert_eq!(ed.mode(), Mode::Draw);
        assert_eq!(ed.display_size(), Some(Size::new(100, 50)));
        assert!(!ed.crop_widget().is_attached());
        // Baseline snapshot only
        assert_eq!(ed.surface().unwrap().history().len(), 1);
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_confirm_draw_uses_crop_result() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(200, 100, GRAY)).unwrap();
        ed.crop_widget_mut()
            .inner
            .set_region(CropRegion::new(0.0, 0.0, 0.5, 1.0));
        ed.confirm_draw(Size::new(100, 100)).unwrap();

        let EditorState::Draw {
            base_image,
            cropped_image,
            ..
        } = ed.state()
        else {
            panic!("expected draw state");
        };
        assert_eq!(base_image.size(), Size::new(200, 100));
        assert_eq!(cropped_image.size(), Size::new(100, 100));
    }

    #[test]
    fn test_extraction_failure_stays_in_crop() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(20, 20, GRAY)).unwrap();
        ed.crop_widget_mut().fail = true;

        let result = ed.confirm_draw(Size::new(100, 100));
        assert!(matches!(result, Err(EditorError::Extraction(_))));
        assert_eq!(ed.mode(), Mode::Crop);
        assert!(ed.crop_widget().is_attached());

        // User retries once the widget recovers
        ed.crop_widget_mut().fail = false;
        ed.confirm_draw(Size::new(100, 100)).unwrap();
        assert_eq!(ed.mode(), Mode::Draw);
    }

    #[test]
    fn test_confirm_draw_zero_viewport_rejected() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(20, 20, GRAY)).unwrap();
        assert!(ed.confirm_draw(Size::new(0, 100)).is_err());
        assert_eq!(ed.mode(), Mode::Crop);
    }

    #[test]
    fn test_confirm_draw_outside_crop_is_noop() {
        let mut ed = editor();
        ed.confirm_draw(Size::new(100, 100)).unwrap();
        assert_eq!(ed.mode(), Mode::Idle);
    }

    #[test]
    fn test_discard_requires_confirmation() {
        let mut ed = drawing_editor();
        draw_line(&mut ed, (10.0, 10.0), (90.0, 10.0));

        assert!(!ed.discard_to_crop(false));
        assert_eq!(ed.mode(), Mode::Draw);
        assert!(ed.can_undo());
    }

    #[test]
    fn test_discard_returns_to_original_capture() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(200, 100, GRAY)).unwrap();
        ed.crop_widget_mut()
            .inner
            .set_region(CropRegion::new(0.0, 0.0, 0.5, 0.5));
        ed.confirm_draw(Size::new(100, 100)).unwrap();
        draw_line(&mut ed, (10.0, 10.0), (90.0, 10.0));

        assert!(ed.discard_to_crop(true));
        assert_eq!(ed.mode(), Mode::Crop);
        assert!(ed.surface().is_none());

        // Widget re-attached to the full capture, not the cropped result
        let source = ed.crop_widget().inner.source().unwrap();
        assert_eq!(source.size(), Size::new(200, 100));
    }

    #[test]
    fn test_reentering_draw_gets_fresh_history() {
        let mut ed = drawing_editor();
        draw_line(&mut ed, (10.0, 10.0), (90.0, 10.0));
        ed.discard_to_crop(true);
        ed.confirm_draw(Size::new(100, 100)).unwrap();

        let surface = ed.surface().unwrap();
        assert_eq!(surface.history().len(), 1);
        assert!(surface.raster().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_retake_from_crop_detaches() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(20, 20, GRAY)).unwrap();

        assert!(ed.retake());
        assert_eq!(ed.mode(), Mode::Idle);
        assert!(!ed.crop_widget().is_attached());
    }

    #[test]
    fn test_retake_from_draw() {
        let mut ed = drawing_editor();
        draw_line(&mut ed, (10.0, 10.0), (90.0, 10.0));

        assert!(ed.retake());
        assert_eq!(ed.mode(), Mode::Idle);
        assert!(ed.surface().is_none());
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_retake_when_idle_is_noop() {
        let mut ed = editor();
        assert!(!ed.retake());
        assert_eq!(ed.crop_widget().detach_calls, 0);
    }

    #[test]
    fn test_drawing_ignored_outside_draw() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(20, 20, GRAY)).unwrap();

        ed.begin_stroke(PointerSample::new(1.0, 1.0));
        ed.extend_stroke(PointerSample::new(5.0, 5.0));
        assert!(!ed.end_stroke());
        assert!(!ed.undo());
        assert!(!ed.redo());
        assert_eq!(ed.mode(), Mode::Crop);
    }

    #[test]
    fn test_color_persists_across_sessions() {
        let mut ed = editor();
        let blue = StrokeColor::rgb(0, 0, 255);
        ed.set_color(blue);

        ed.capture(RasterImage::filled(20, 20, GRAY)).unwrap();
        ed.confirm_draw(Size::new(20, 20)).unwrap();
        assert_eq!(ed.surface().unwrap().color(), blue);
    }

    #[test]
    fn test_resize_display_refits() {
        let mut ed = drawing_editor();
        ed.resize_display(Size::new(400, 400)).unwrap();
        assert_eq!(ed.display_size(), Some(Size::new(400, 200)));
    }

    #[test]
    fn test_resize_display_outside_draw_is_noop() {
        let mut ed = editor();
        assert!(ed.resize_display(Size::new(400, 400)).is_ok());
    }

    #[test]
    fn test_pinch_zoom_only_while_idle() {
        let mut ed = editor();
        let mut camera = FakeCamera::new(64, 48);
        ed.start_camera(&mut camera, Facing::Environment).unwrap();

        let near = [PointerSample::new(0.0, 0.0), PointerSample::new(100.0, 0.0)];
        let far = [PointerSample::new(0.0, 0.0), PointerSample::new(300.0, 0.0)];

        ed.pointers_changed(&near, &mut camera);
        assert_eq!(ed.pointers_changed(&far, &mut camera), Some(3.0));

        ed.pointers_changed(&[], &mut camera);
        ed.capture_from(&mut camera).unwrap();
        assert_eq!(ed.pointers_changed(&near, &mut camera), None);
        assert_eq!(ed.pointers_changed(&far, &mut camera), None);
        assert_eq!(camera.applied, vec![3.0]);
    }

    #[test]
    fn test_export_idle_has_nothing() {
        let mut ed = editor();
        let mut sink = RecordingSink::default();
        let result = ed.export(&ExportRequest::Share, &mut sink);
        assert!(matches!(
            result,
            Err(EditorError::Export(ExportError::NothingToExport))
        ));
    }

    #[test]
    fn test_export_in_crop_uses_widget() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(40, 20, GRAY)).unwrap();
        ed.crop_widget_mut()
            .inner
            .set_region(CropRegion::new(0.0, 0.0, 0.5, 0.5));

        let image = ed.export_image().unwrap();
        assert_eq!(image.size(), Size::new(20, 10));
        // Still cropping
        assert_eq!(ed.mode(), Mode::Crop);
        assert!(ed.crop_widget().is_attached());
    }

    #[test]
    fn test_export_extraction_failure_keeps_state() {
        let mut ed = editor();
        ed.capture(RasterImage::filled(40, 20, GRAY)).unwrap();
        ed.crop_widget_mut().fail = true;

        let mut sink = RecordingSink::default();
        let result = ed.export(&ExportRequest::Share, &mut sink);
        assert!(matches!(
            result,
            Err(EditorError::Export(ExportError::Extraction(_)))
        ));
        assert_eq!(ed.mode(), Mode::Crop);
    }

    #[test]
    fn test_export_failure_and_cancel_keep_state() {
        let mut ed = drawing_editor();
        draw_line(&mut ed, (10.0, 10.0), (90.0, 10.0));

        let mut sink = RecordingSink {
            cancel_share: true,
            ..Default::default()
        };
        assert!(ed.export(&ExportRequest::Clipboard, &mut sink).is_err());
        assert_eq!(
            ed.export(&ExportRequest::Share, &mut sink).unwrap(),
            ExportOutcome::ShareCancelled
        );

        assert_eq!(ed.mode(), Mode::Draw);
        assert!(ed.can_undo());
    }

    #[test]
    fn test_capture_draw_undo_export_end_to_end() {
        let mut ed = drawing_editor();
        let red = ed.color();

        // Display is 100x50 over a 200x100 native image
        draw_line(&mut ed, (10.0, 10.0), (90.0, 10.0));
        draw_line(&mut ed, (10.0, 40.0), (90.0, 40.0));
        assert!(ed.undo());
        assert!(ed.can_redo());

        let mut sink = RecordingSink::default();
        let request = ExportRequest::Download {
            filename: Some("note.png".to_string()),
        };
        let outcome = ed.export(&request, &mut sink).unwrap();
        assert_eq!(
            outcome,
            ExportOutcome::Downloaded {
                filename: "note.png".to_string()
            }
        );

        let (encoded, _) = &sink.downloads[0];
        assert_eq!((encoded.width, encoded.height), (200, 100));
        let decoded = image::load_from_memory(&encoded.bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (200, 100));

        // First stroke (display y=10) appears at native y=20
        let stroke = decoded.get_pixel(100, 20).0;
        assert!(stroke[0] > 240, "expected red stroke, got {:?}", stroke);
        assert!(stroke[1] < 15 && stroke[2] < 15);
        assert_eq!(red, StrokeColor::RED);

        // Undone second stroke (display y=40 -> native y=80) is gone
        assert_eq!(decoded.get_pixel(100, 80).0, GRAY);
        assert_eq!(decoded.get_pixel(5, 95).0, GRAY);

        // Export didn't change anything
        assert_eq!(ed.mode(), Mode::Draw);
        assert!(ed.can_redo());
    }
}
