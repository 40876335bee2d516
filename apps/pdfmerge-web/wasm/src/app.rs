//! Event wiring between the page and the merge orchestrator

use crate::config::UiConfig;
use crate::dom::{must_get, must_get_input, DomView};
use crate::download::download_bytes;
use crate::file::{js_error_detail, read_bytes, selected_file, BrowserFile};
use crate::format_bytes;
use futures::future::try_join;
use pdfmerge_core::{LopdfEngine, MergeError, MergeOrchestrator, MergeView, Slot, StatusLevel};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, EventTarget, HtmlInputElement};

type Orchestrator = MergeOrchestrator<LopdfEngine, DomView, BrowserFile>;
type Shared = Rc<RefCell<Orchestrator>>;

/// Handle to a bound page
///
/// Event listeners stay registered for the life of the page; dropping the
/// handle only drops JavaScript's view of the session.
#[wasm_bindgen]
pub struct MergeApp {
    orchestrator: Shared,
}

#[wasm_bindgen]
impl MergeApp {
    /// Whether a merged PDF is ready to download
    #[wasm_bindgen(js_name = hasMergedPdf)]
    pub fn has_merged_pdf(&self) -> bool {
        self.orchestrator.borrow().artifact().is_some()
    }

    /// File name the merged PDF will be saved under, if any
    #[wasm_bindgen(js_name = mergedFileName)]
    pub fn merged_file_name(&self) -> Option<String> {
        self.orchestrator
            .borrow()
            .artifact()
            .map(|artifact| artifact.file_name.clone())
    }

    #[wasm_bindgen(js_name = mergedPageCount)]
    pub fn merged_page_count(&self) -> u32 {
        self.orchestrator
            .borrow()
            .artifact()
            .map_or(0, |artifact| artifact.page_count)
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.orchestrator.borrow().is_busy()
    }

    #[wasm_bindgen(js_name = statusText)]
    pub fn status_text(&self) -> String {
        self.orchestrator.borrow().view().status_text()
    }
}

/// Bind the merge UI to the current page
///
/// Fails if any configured element is missing from the document.
#[wasm_bindgen(js_name = bindMergeUi)]
pub fn bind_merge_ui(config: JsValue) -> Result<MergeApp, JsValue> {
    let config = UiConfig::from_js(config)?;
    let document = current_document()?;
    bind(&document, config).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Bind once the DOM is parsed (immediately if it already is)
#[wasm_bindgen(js_name = bindOnDomReady)]
pub fn bind_on_dom_ready(config: JsValue) -> Result<(), JsValue> {
    let config = UiConfig::from_js(config)?;
    let document = current_document()?;

    if document.ready_state() != "loading" {
        bind(&document, config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        return Ok(());
    }

    let deferred = document.clone();
    let on_ready = Closure::once(Box::new(move |_event: web_sys::Event| {
        if let Err(e) = bind(&deferred, config) {
            web_sys::console::error_1(&e.to_string().into());
        }
    }) as Box<dyn FnOnce(_)>);
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
    on_ready.forget();

    Ok(())
}

fn current_document() -> Result<Document, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    Ok(window.document().ok_or("No document")?)
}

fn bind(document: &Document, config: UiConfig) -> Result<MergeApp, MergeError> {
    let first_input = must_get_input(document, &config.first_input_id)?;
    let second_input = must_get_input(document, &config.second_input_id)?;
    let merge_button = must_get(document, &config.merge_button_id)?;
    let download_button = must_get(document, &config.download_button_id)?;
    let status = must_get(document, &config.status_id)?;
    let log = must_get(document, &config.log_id)?;

    let view = DomView::new(status, log, download_button.clone());
    let orchestrator: Shared = Rc::new(RefCell::new(MergeOrchestrator::new(
        LopdfEngine::new(config.engine),
        view,
    )));

    on_selection_change(&orchestrator, Slot::First, first_input);
    on_selection_change(&orchestrator, Slot::Second, second_input);
    on_merge_click(&orchestrator, &merge_button);
    on_download_click(&orchestrator, &download_button, config.revoke_delay_ms);

    orchestrator.borrow_mut().start();

    Ok(MergeApp { orchestrator })
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        web_sys::console::error_2(&format!("Failed to listen for {}", event).into(), &e);
    }
    closure.forget();
}

fn on_selection_change(orchestrator: &Shared, slot: Slot, input: HtmlInputElement) {
    let orchestrator = orchestrator.clone();
    let target = input.clone();
    listen(&target, "change", move |_event| {
        let file = selected_file(&input);
        orchestrator.borrow_mut().select(slot, file);
    });
}

fn on_merge_click(orchestrator: &Shared, button: &Element) {
    let orchestrator = orchestrator.clone();
    listen(button, "click", move |_event| {
        spawn_local(run_merge(orchestrator.clone()));
    });
}

async fn run_merge(orchestrator: Shared) {
    let ticket = match orchestrator.borrow_mut().begin_merge() {
        Ok(ticket) => ticket,
        Err(e) => {
            web_sys::console::warn_1(&e.to_string().into());
            return;
        }
    };

    // Both reads in flight at once; page order is fixed later by the pipeline.
    let reads = try_join(
        read_bytes(Slot::First, &ticket.first),
        read_bytes(Slot::Second, &ticket.second),
    )
    .await;

    let mut orchestrator = orchestrator.borrow_mut();
    match reads {
        Ok((first, second)) => {
            if let Err(e) = orchestrator.complete_merge(ticket, &first, &second) {
                web_sys::console::error_1(&e.to_string().into());
            }
        }
        Err(e) => {
            web_sys::console::error_1(&e.to_string().into());
            orchestrator.fail_merge(ticket, e);
        }
    }
}

fn on_download_click(orchestrator: &Shared, button: &Element, revoke_delay_ms: i32) {
    let orchestrator = orchestrator.clone();
    listen(button, "click", move |_event| {
        let mut orchestrator = orchestrator.borrow_mut();

        let saved = orchestrator.download().map(|artifact| {
            let line = format!(
                "Downloading {} ({})",
                artifact.file_name,
                format_bytes(artifact.bytes.len())
            );
            download_bytes(&artifact.bytes, &artifact.file_name, revoke_delay_ms).map(|_| line)
        });

        match saved {
            Some(Ok(line)) => orchestrator.view_mut().append_log(&line),
            Some(Err(e)) => {
                let detail = js_error_detail(&e);
                let view = orchestrator.view_mut();
                view.set_status(&format!("Error: {}", detail), StatusLevel::Error);
                view.append_log(&format!("Error: download failed: {}", detail));
            }
            None => {}
        }
    });
}
