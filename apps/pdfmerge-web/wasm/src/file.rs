//! Selected browser files

use js_sys::Uint8Array;
use pdfmerge_core::{MergeError, SelectedFile, Slot};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

#[derive(Debug, Clone)]
pub struct BrowserFile(pub File);

impl SelectedFile for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }
}

/// First file chosen in `input`, if any
pub fn selected_file(input: &HtmlInputElement) -> Option<BrowserFile> {
    input.files()?.get(0).map(BrowserFile)
}

/// Read the whole file into memory
pub async fn read_bytes(input: Slot, file: &BrowserFile) -> Result<Vec<u8>, MergeError> {
    let buffer = JsFuture::from(file.0.array_buffer())
        .await
        .map_err(|e| MergeError::FileRead {
            input,
            detail: js_error_detail(&e),
        })?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Best-effort message (and stack, when present) of a thrown JS value
pub fn js_error_detail(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        let message = String::from(err.message());
        let stack = js_sys::Reflect::get(err, &"stack".into())
            .ok()
            .and_then(|s| s.as_string());
        return match stack {
            Some(stack) if !stack.is_empty() => format!("{}\n{}", message, stack),
            _ => message,
        };
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
