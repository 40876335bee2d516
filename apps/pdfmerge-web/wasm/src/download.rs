//! Client-side save of the merged PDF

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, Url, Window};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Offer `bytes` as a download named `file_name`
///
/// The object URL is revoked `revoke_delay_ms` after the click so the
/// browser has time to start reading it.
pub fn download_bytes(bytes: &[u8], file_name: &str, revoke_delay_ms: i32) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let body = document.body().ok_or("No document body")?;

    let url = Url::create_object_url_with_blob(&pdf_blob(bytes)?)?;

    let anchor = save_anchor(&document, &url, file_name)?;
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();

    schedule_revoke(&window, url, revoke_delay_ms)?;
    Ok(())
}

/// Wrap `bytes` in a Blob typed as a PDF
pub fn pdf_blob(bytes: &[u8]) -> Result<Blob, JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(PDF_MIME_TYPE);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Detached anchor that saves `url` under `file_name` when clicked
fn save_anchor(
    document: &Document,
    url: &str,
    file_name: &str,
) -> Result<HtmlAnchorElement, JsValue> {
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(url);
    anchor.set_download(file_name);
    Ok(anchor)
}

/// Revoke `url` once `delay_ms` has passed, returning the timer handle
fn schedule_revoke(window: &Window, url: String, delay_ms: i32) -> Result<i32, JsValue> {
    let revoke = Closure::once_into_js(move || {
        if let Err(e) = Url::revoke_object_url(&url) {
            web_sys::console::warn_2(&"Failed to revoke object URL".into(), &e);
        }
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), delay_ms)
}
