//! DOM lookups and the `MergeView` over real page elements

use pdfmerge_core::{MergeError, MergeView, StatusLevel};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement};

/// Look up a required element by id
pub fn must_get(document: &Document, id: &str) -> Result<Element, MergeError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| MergeError::MissingElement(format!("#{}", id)))
}

/// Look up a required `<input type="file">` by id
pub fn must_get_input(document: &Document, id: &str) -> Result<HtmlInputElement, MergeError> {
    must_get(document, id)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| MergeError::MissingElement(format!("#{} (not an input)", id)))
}

/// Status box, log element and download button
pub struct DomView {
    status: Element,
    log: Element,
    download_button: Element,
}

impl DomView {
    pub fn new(status: Element, log: Element, download_button: Element) -> Self {
        Self {
            status,
            log,
            download_button,
        }
    }

    pub fn status_text(&self) -> String {
        self.status.text_content().unwrap_or_default()
    }
}

impl MergeView for DomView {
    fn set_status(&mut self, message: &str, level: StatusLevel) {
        self.status.set_class_name(level.as_class());
        self.status.set_text_content(Some(message));
    }

    fn append_log(&mut self, line: &str) {
        web_sys::console::log_1(&line.into());

        let mut text = self.log.text_content().unwrap_or_default();
        text.push_str(line);
        text.push('\n');
        self.log.set_text_content(Some(&text));
    }

    fn set_download_enabled(&mut self, enabled: bool) {
        let result = if enabled {
            self.download_button.remove_attribute("disabled")
        } else {
            self.download_button.set_attribute("disabled", "")
        };
        if let Err(e) = result {
            web_sys::console::error_2(&"Failed to toggle download button".into(), &e);
        }
    }
}
