//! Page bindings configuration
//!
//! JavaScript may pass a partial object; anything it leaves out keeps the
//! default ids of the bundled `index.html`.

use pdfmerge_core::EngineOptions;
use serde::Deserialize;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub first_input_id: String,
    pub second_input_id: String,
    pub merge_button_id: String,
    pub download_button_id: String,
    pub status_id: String,
    pub log_id: String,
    /// Delay before the download object URL is revoked
    pub revoke_delay_ms: i32,
    /// Options for the PDF engine the page merges with
    pub engine: EngineOptions,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            first_input_id: "pdfA".to_string(),
            second_input_id: "pdfB".to_string(),
            merge_button_id: "mergeBtn".to_string(),
            download_button_id: "downloadMergedBtn".to_string(),
            status_id: "statusBox".to_string(),
            log_id: "log".to_string(),
            revoke_delay_ms: 1000,
            engine: EngineOptions::default(),
        }
    }
}

impl UiConfig {
    /// Read from a JS value; `undefined` and `null` mean defaults
    pub fn from_js(value: JsValue) -> Result<Self, JsValue> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {}", e)))
    }
}
