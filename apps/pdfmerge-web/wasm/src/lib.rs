//! WASM bindings for the two-file PDF merge page
//!
//! All state lives in Rust. JavaScript only loads the module and calls one
//! binding function; the page's inputs, buttons, status box and log are
//! wired up from here.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { bindOnDomReady } from './pkg/pdfmerge_wasm.js';
//!
//! await init();
//! bindOnDomReady();                          // default element ids
//! bindOnDomReady({ statusId: "status" });    // or override some of them
//! ```

pub mod app;
pub mod config;
pub mod dom;
pub mod download;
pub mod file;

use wasm_bindgen::prelude::*;

pub use app::{bind_merge_ui, bind_on_dom_ready, MergeApp};
pub use config::UiConfig;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"PDF merge WASM initialized".into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get page count from PDF bytes
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    pdfmerge_core::get_page_count(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(2621440), "2.5 MB");
    }
}
