//! Editor session WASM bindings.
//!
//! `JsEditor` wraps the core [`Editor`] with the headless [`RegionCropper`].
//! The page keeps ownership of the camera stream and the DOM: it hands over
//! captured frames as RGBA bytes, reports where the annotation canvas sits on
//! screen, and forwards pointer events in client coordinates.
//!
//! Device and export callbacks are plain JS functions:
//!
//! - zoom: `(value: number) => boolean | void`. Returning `false` or
//!   throwing means the camera rejected the value.
//! - export: `(target: "clipboard" | "share" | "download", bytes, mime,
//!   filename) => boolean | void`. For `"share"`, returning `false` means the
//!   user dismissed the share sheet.

use js_sys::{Function, Uint8Array};
use snapsketch_core::geometry::primary_sample;
use snapsketch_core::{
    BoundingBox, CropRegion, DeviceError, Editor, EditorConfig, EditorError, EncodedImage, ExportError,
    ExportOutcome, ExportRequest, ExportSink, Mode, PointerEvent, PointerSample, RasterImage,
    RegionCropper, ShareOutcome, Size, StrokeColor, ZoomDevice, ZoomRange,
};
use wasm_bindgen::prelude::*;

use crate::types::JsRasterImage;

/// A capture → crop → draw editing session for JavaScript.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor<RegionCropper>,
    /// Annotation canvas box in viewport coordinates.
    bounds: BoundingBox,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor in the Idle state.
    ///
    /// `config` is an optional plain object matching `EditorConfig`; missing
    /// fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// Current mode: "idle", "crop" or "draw".
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode().to_string()
    }

    // ------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------

    /// Report the zoom range of the opened camera track, and optionally the
    /// zoom it is using now (`track.getSettings().zoom`).
    pub fn set_zoom_range(&mut self, min: f64, max: f64, step: f64, current: Option<f64>) {
        self.inner
            .set_zoom_range(Some(ZoomRange::new(min, max, step)), current);
    }

    /// The camera has no zoom capability; pinch gestures become inert.
    pub fn clear_zoom_range(&mut self) {
        self.inner.set_zoom_range(None, None);
    }

    #[wasm_bindgen(getter)]
    pub fn current_zoom(&self) -> f64 {
        self.inner.zoom().current_zoom()
    }

    /// Feed the active touches over the preview as flat `[x0, y0, x1, y1, ...]`
    /// client coordinates.
    ///
    /// Returns the zoom value passed to `apply_zoom`, if one was applied.
    pub fn touches_changed(&mut self, coords: Vec<f64>, apply_zoom: &Function) -> Option<f64> {
        // Only distances matter, so viewport space is fine here.
        let pointers: Vec<PointerSample> = coords
            .chunks_exact(2)
            .map(|c| PointerSample::new(c[0], c[1]))
            .collect();
        let mut device = JsZoomDevice { apply: apply_zoom };
        self.inner.pointers_changed(&pointers, &mut device)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Capture a frame from canvas `ImageData` bytes (RGBA).
    pub fn capture_rgba(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), JsValue> {
        let frame = RasterImage::from_rgba(width, height, rgba).ok_or_else(|| {
            JsValue::from_str(&format!(
                "RGBA buffer is {} bytes, expected {}",
                rgba.len(),
                width as usize * height as usize * 4
            ))
        })?;
        self.capture_frame(frame).map_err(to_js)
    }

    /// Capture a frame that is already an RGB image.
    pub fn capture(&mut self, image: &JsRasterImage) -> Result<(), JsValue> {
        self.capture_frame(image.to_raster()).map_err(to_js)
    }

    /// Set the crop rectangle in normalized image coordinates.
    pub fn set_crop_region(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.inner
            .crop_widget_mut()
            .set_region(CropRegion::new(left, top, width, height));
    }

    /// Apply the crop and switch to drawing.
    ///
    /// `viewport_width`/`viewport_height` describe the area the cropped
    /// image will be shown in, after layout.
    pub fn confirm_draw(&mut self, viewport_width: u32, viewport_height: u32) -> Result<(), JsValue> {
        self.inner
            .confirm_draw(Size::new(viewport_width, viewport_height))
            .map_err(to_js)
    }

    /// Leave drawing and return to cropping. `confirmed` is the answer to
    /// the "discard annotations?" prompt.
    pub fn discard_to_crop(&mut self, confirmed: bool) -> bool {
        self.inner.discard_to_crop(confirmed)
    }

    /// Drop the capture and return to the live camera.
    pub fn retake(&mut self) -> bool {
        self.inner.retake()
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Where the annotation canvas currently sits (`getBoundingClientRect`).
    pub fn set_surface_bounds(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.bounds = BoundingBox::new(left, top, width, height);
    }

    pub fn begin_stroke(&mut self, client_x: f64, client_y: f64) {
        let point = self.surface_point(client_x, client_y);
        self.inner.begin_stroke(point);
    }

    pub fn extend_stroke(&mut self, client_x: f64, client_y: f64) {
        let point = self.surface_point(client_x, client_y);
        self.inner.extend_stroke(point);
    }

    /// Finish the stroke. Returns `true` if a history entry was recorded.
    pub fn end_stroke(&mut self) -> bool {
        self.inner.end_stroke()
    }

    /// Set the stroke color from a `#rrggbb` or `#rrggbbaa` string.
    pub fn set_color(&mut self, hex: &str) -> Result<(), JsValue> {
        let color: StrokeColor = hex.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner.set_color(color);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn color(&self) -> String {
        self.inner.color().to_string()
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    /// Erase all annotations (undoable).
    pub fn clear(&mut self) {
        self.inner.clear_annotations();
    }

    /// The viewport was resized while drawing.
    pub fn resize_display(&mut self, viewport_width: u32, viewport_height: u32) -> Result<(), JsValue> {
        self.inner
            .resize_display(Size::new(viewport_width, viewport_height))
            .map_err(to_js)
    }

    /// Displayed width of the annotation layer (0 outside Draw).
    #[wasm_bindgen(getter)]
    pub fn display_width(&self) -> u32 {
        self.inner.display_size().map_or(0, |s| s.width)
    }

    /// Displayed height of the annotation layer (0 outside Draw).
    #[wasm_bindgen(getter)]
    pub fn display_height(&self) -> u32 {
        self.inner.display_size().map_or(0, |s| s.height)
    }

    /// Annotation layer as straight RGBA, ready for `putImageData`.
    ///
    /// Empty outside the Draw state.
    pub fn annotation_rgba(&self) -> Vec<u8> {
        let Some(surface) = self.inner.surface() else {
            return Vec::new();
        };
        let pixmap = surface.raster();
        let mut out = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// The composited image at native resolution.
    pub fn export_image(&mut self) -> Result<JsRasterImage, JsValue> {
        self.inner
            .export_image()
            .map(JsRasterImage::from_raster)
            .map_err(to_js)
    }

    /// The composited image encoded in the configured format.
    pub fn export_encoded(&mut self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .export_encoded()
            .map(|encoded| encoded.bytes)
            .map_err(to_js)
    }

    /// MIME type of `export_encoded` output.
    #[wasm_bindgen(getter)]
    pub fn export_mime_type(&self) -> String {
        self.inner.config().export.format.mime_type().to_string()
    }

    /// Default download name, e.g. "snapsketch.png".
    #[wasm_bindgen(getter)]
    pub fn export_filename(&self) -> String {
        self.inner.config().export.default_filename()
    }

    /// Export to `"clipboard"`, `"share"` or `"download"` through `handler`.
    ///
    /// Returns "copied", "shared", "share-cancelled" or "downloaded".
    pub fn export_to(
        &mut self,
        target: &str,
        filename: Option<String>,
        handler: &Function,
    ) -> Result<String, JsValue> {
        let request = parse_request(target, filename)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown export target: {}", target)))?;
        let mut sink = CallbackSink { handler };
        let outcome = self.inner.export(&request, &mut sink).map_err(to_js)?;
        Ok(outcome_name(&outcome).to_string())
    }
}

impl JsEditor {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            inner: Editor::new(RegionCropper::new(), config),
            bounds: BoundingBox::default(),
        }
    }

    /// Capture `frame` and reset the crop rectangle to the whole image.
    fn capture_frame(&mut self, frame: RasterImage) -> Result<(), EditorError> {
        let was_idle = self.inner.mode() == Mode::Idle;
        self.inner.capture(frame)?;
        if was_idle {
            self.inner.crop_widget_mut().reset_region();
        }
        Ok(())
    }

    fn surface_point(&self, client_x: f64, client_y: f64) -> PointerSample {
        let event = PointerEvent::Mouse { client_x, client_y };
        primary_sample(&event, &self.bounds).unwrap_or_default()
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_request(target: &str, filename: Option<String>) -> Option<ExportRequest> {
    match target {
        "clipboard" => Some(ExportRequest::Clipboard),
        "share" => Some(ExportRequest::Share),
        "download" => Some(ExportRequest::Download { filename }),
        _ => None,
    }
}

fn outcome_name(outcome: &ExportOutcome) -> &'static str {
    match outcome {
        ExportOutcome::Copied => "copied",
        ExportOutcome::Shared => "shared",
        ExportOutcome::ShareCancelled => "share-cancelled",
        ExportOutcome::Downloaded { .. } => "downloaded",
    }
}

/// Zoom device backed by a JS callback.
struct JsZoomDevice<'a> {
    apply: &'a Function,
}

impl ZoomDevice for JsZoomDevice<'_> {
    fn apply_zoom(&mut self, value: f64) -> Result<(), DeviceError> {
        match self.apply.call1(&JsValue::NULL, &JsValue::from_f64(value)) {
            Ok(ret) if ret.as_bool() == Some(false) => {
                Err(DeviceError::Rejected(format!("zoom {} not accepted", value)))
            }
            Ok(_) => Ok(()),
            Err(e) => Err(DeviceError::Rejected(
                e.as_string().unwrap_or_else(|| "zoom callback threw".to_string()),
            )),
        }
    }
}

/// Export sink forwarding every target to one JS handler.
struct CallbackSink<'a> {
    handler: &'a Function,
}

impl CallbackSink<'_> {
    fn call(
        &self,
        target: &str,
        image: &EncodedImage,
        filename: &str,
    ) -> Result<JsValue, ExportError> {
        let bytes = Uint8Array::from(image.bytes.as_slice());
        let args = js_sys::Array::of4(
            &JsValue::from_str(target),
            &bytes,
            &JsValue::from_str(image.mime_type()),
            &JsValue::from_str(filename),
        );
        self.handler
            .apply(&JsValue::NULL, &args)
            .map_err(|e| {
                ExportError::Sink(e.as_string().unwrap_or_else(|| format!("{} handler threw", target)))
            })
    }
}

impl ExportSink for CallbackSink<'_> {
    fn write_to_clipboard(&mut self, image: &EncodedImage) -> Result<(), ExportError> {
        self.call("clipboard", image, "").map(|_| ())
    }

    fn share(&mut self, image: &EncodedImage) -> Result<ShareOutcome, ExportError> {
        let ret = self.call("share", image, "")?;
        if ret.as_bool() == Some(false) {
            Ok(ShareOutcome::Cancelled)
        } else {
            Ok(ShareOutcome::Shared)
        }
    }

    fn download_as(&mut self, image: &EncodedImage, filename: &str) -> Result<(), ExportError> {
        self.call("download", image, filename).map(|_| ())
    }
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_constructor_reads_config() {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &"stroke_color".into(), &"#00ff00".into()).unwrap();
        let editor = JsEditor::new(config.into()).unwrap();
        assert_eq!(editor.color(), "#00ff00");

        let editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(editor.color(), "#ff0000");
    }

    #[wasm_bindgen_test]
    fn test_export_without_capture_fails() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert!(editor.export_encoded().is_err());
    }

    #[wasm_bindgen_test]
    fn test_capture_rejects_short_buffer() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        let image = JsRasterImage::new(10, 10, vec![0u8; 3]);
        assert!(editor.capture(&image).is_err());
        assert_eq!(editor.mode(), "idle");

        editor.set_crop_region(0.0, 0.0, 0.5, 0.5);
        assert!(editor.confirm_draw(100, 100).is_ok());
        assert_eq!(editor.mode(), "idle");
    }

    #[wasm_bindgen_test]
    fn test_set_color_rejects_garbage() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert!(editor.set_color("not a color").is_err());
        assert_eq!(editor.color(), "#ff0000");
    }

    #[wasm_bindgen_test]
    fn test_share_cancel_via_handler() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        editor.capture_rgba(2, 2, &[0u8; 16]).unwrap();
        let handler = Function::new_with_args("target", "return target !== 'share';");
        let outcome = editor.export_to("share", None, &handler).unwrap();
        assert_eq!(outcome, "share-cancelled");
        assert_eq!(editor.mode(), "crop");
    }

    #[wasm_bindgen_test]
    fn test_pinch_applies_zoom() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        editor.set_zoom_range(1.0, 5.0, 0.1, None);
        let apply = Function::new_with_args("z", "return true;");

        assert_eq!(editor.touches_changed(vec![0.0, 0.0, 100.0, 0.0], &apply), None);
        let applied = editor.touches_changed(vec![0.0, 0.0, 200.0, 0.0], &apply);
        assert_eq!(applied, Some(2.0));
        assert_eq!(editor.current_zoom(), 2.0);
    }
}
