//! Snapsketch WASM - WebAssembly bindings for Snapsketch
//!
//! This crate exposes the snapsketch-core editing engine to JavaScript/TypeScript.
//! The page owns the camera stream, the DOM and the clipboard; this crate owns
//! the editor state, the annotation layer and export compositing.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`, the capture/crop/draw session
//! - `types` - WASM-compatible wrapper types for image data
//! - `encode` - Image encoding bindings (PNG/JPEG export)
//! - `logging` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@snapsketch/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor({ stroke_color: '#00ff00' });
//! editor.capture_rgba(frame.width, frame.height, frame.data);
//! editor.confirm_draw(viewport.clientWidth, viewport.clientHeight);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod encode;
mod logging;
mod types;

// Re-export public types
pub use editor::JsEditor;
pub use encode::{encode_jpeg, encode_png};
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::init(log::LevelFilter::Info);
}

/// Change how much the engine logs to the console.
///
/// Accepts "error", "warn", "info", "debug" or "trace"; anything else is ignored.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    if let Some(filter) = logging::parse_level(level) {
        log::set_max_level(filter);
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
