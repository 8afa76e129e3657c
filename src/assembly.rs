//! # Assembly Module
//!
//! WASM-exported surface of the viewer. It is the bridge between the JS UI
//! (toolbar, sidebar, page surface) and the Rust `Viewer`.
//!
//! ## Overview
//!
//! - `PdfViewer`: one instance per open viewer. Toolbar buttons, keyboard
//!   and pointer events call its methods; the overlay layer redraws from
//!   `overlay()`.
//! - `load_pdf` / `load_pdf_base64`: ask pdf.js for the page count of the
//!   uploaded bytes.
//! - `init_logging`: route `log` output to the browser console.
//!
//! Methods returning `JsValue` hand back a JSON string. Failures are
//! reported as `{"error": "..."}` rather than thrown.

use crate::annotation::Annotation;
use crate::logging;
use crate::pdfjs_bindings::{load_pdf_document_js, parse_load_result};
use crate::schema::{ViewerError, ViewerOptions};
use crate::session::Tool;
use crate::viewer::Viewer;
use base64::Engine;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

fn to_js<T: Serialize>(result: Result<T, ViewerError>) -> JsValue {
    match result {
        Ok(value) => match serde_json::to_string(&value) {
            Ok(s) => JsValue::from_str(&s),
            Err(_) => JsValue::from_str(&json!({"error": "serialization failed"}).to_string()),
        },
        Err(err) => JsValue::from_str(&json!({"error": err.to_string()}).to_string()),
    }
}

#[derive(Serialize)]
struct SidebarEntry<'a> {
    annotation: &'a Annotation,
    summary: String,
}

#[derive(Serialize)]
struct PageGroup<'a> {
    page: u32,
    count: usize,
    annotations: Vec<SidebarEntry<'a>>,
}

/// Viewer handle owned by the JS application.
///
/// # Example
///
/// ```javascript
/// const viewer = new PdfViewer(JSON.stringify({ max_scale: 3.0 }));
/// const opened = JSON.parse(viewer.open_file(file.name, file.type, file.size, head));
/// if (opened.error) {
///     toast.error(opened.error);
/// } else {
///     const reply = JSON.parse(await load_pdf(bytes));
///     if (reply.error) viewer.document_load_failed(opened.generation, reply.error);
///     else viewer.document_loaded(opened.generation, reply.page_count);
/// }
/// ```
#[wasm_bindgen]
pub struct PdfViewer {
    inner: Viewer,
}

#[wasm_bindgen]
impl PdfViewer {
    /// Creates a viewer. Invalid options are logged and replaced with the
    /// defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> PdfViewer {
        let parsed = ViewerOptions::from_json(options_json.as_deref());
        let options = parsed.clone().unwrap_or_default();
        logging::init(options.level_filter());
        if let Err(err) = parsed {
            log::warn!("{}; using default options", err);
        }
        PdfViewer {
            inner: Viewer::new(options),
        }
    }

    /// Validates an upload and starts a new session.
    ///
    /// Returns `{"generation": n}`; pass `n` back with the load result.
    /// `size` is a JS number of bytes, `head` the first bytes of the file.
    pub fn open_file(&mut self, name: &str, media_type: &str, size: f64, head: &[u8]) -> JsValue {
        let result = self
            .inner
            .open_file(name, media_type, size.max(0.0) as u64, head)
            .map(|generation| json!({ "generation": generation }));
        to_js(result)
    }

    pub fn close_file(&mut self) {
        self.inner.close_file();
    }

    /// Returns `{"applied": bool}`; stale results report `false`.
    pub fn document_loaded(&mut self, generation: f64, page_count: u32) -> JsValue {
        let result = self
            .inner
            .document_loaded(generation as u64, page_count)
            .map(|applied| json!({ "applied": applied }));
        to_js(result)
    }

    pub fn document_load_failed(&mut self, generation: f64, message: &str) -> bool {
        self.inner.document_load_failed(generation as u64, message)
    }

    pub fn set_tool(&mut self, tool: &str) -> JsValue {
        let result = tool.parse::<Tool>().map(|tool| {
            self.inner.set_tool(tool);
            json!({ "tool": tool })
        });
        to_js(result)
    }

    pub fn set_scale(&mut self, scale: f64) -> JsValue {
        let result = self
            .inner
            .set_scale(scale)
            .map(|_| json!({ "scale": scale }));
        to_js(result)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.inner.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.inner.zoom_out()
    }

    /// Rotates by `delta` degrees (a multiple of 90).
    pub fn rotate(&mut self, delta: i32) -> JsValue {
        let result = self
            .inner
            .rotate_by(delta)
            .map(|rotation| json!({ "rotation": rotation }));
        to_js(result)
    }

    pub fn go_to_page(&mut self, page: u32) -> JsValue {
        let result = self.inner.go_to_page(page).map(|_| json!({ "page": page }));
        to_js(result)
    }

    pub fn next_page(&mut self) -> bool {
        self.inner.change_page(1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.inner.change_page(-1)
    }

    pub fn handle_key(&mut self, key: &str) -> bool {
        self.inner.handle_key(key)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> JsValue {
        to_js(Ok(self.inner.pointer_down(x, y)))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> JsValue {
        to_js(Ok(self.inner.pointer_move(x, y)))
    }

    pub fn pointer_up(&mut self) -> JsValue {
        to_js(self.inner.pointer_up())
    }

    pub fn pointer_leave(&mut self) -> JsValue {
        to_js(self.inner.pointer_leave())
    }

    pub fn commit_comment(&mut self, text: &str) -> JsValue {
        to_js(self.inner.commit_comment(text))
    }

    pub fn cancel_comment(&mut self) -> JsValue {
        to_js(self.inner.cancel_comment())
    }

    /// Screen-space shapes for the current page.
    pub fn overlay(&self) -> JsValue {
        to_js(Ok(self.inner.overlay()))
    }

    pub fn snapshot(&self) -> JsValue {
        to_js(Ok(self.inner.session().snapshot()))
    }

    pub fn annotations(&self) -> JsValue {
        to_js(Ok(self.inner.session().annotations()))
    }

    /// Annotations grouped by page with their list labels, for the sidebar.
    pub fn annotations_by_page(&self) -> JsValue {
        let groups: Vec<PageGroup> = self
            .inner
            .session()
            .annotations_by_page()
            .into_iter()
            .map(|(page, annotations)| PageGroup {
                page,
                count: annotations.len(),
                annotations: annotations
                    .into_iter()
                    .map(|annotation| SidebarEntry {
                        annotation,
                        summary: annotation.summary(),
                    })
                    .collect(),
            })
            .collect();
        to_js(Ok(groups))
    }
}

/// Opens `bytes` with pdf.js and reports the page count.
///
/// Returns `{"page_count": n}` or `{"error": "..."}`.
#[wasm_bindgen]
pub async fn load_pdf(bytes: Vec<u8>) -> JsValue {
    let reply = match load_pdf_document_js(&bytes).await {
        Ok(reply) => reply,
        Err(err) => {
            let message = err.as_string().unwrap_or_else(|| format!("{:?}", err));
            return to_js::<()>(Err(ViewerError::LoadFailed(message)));
        }
    };
    let result = reply
        .as_string()
        .ok_or_else(|| ViewerError::LoadFailed("pdf.js returned no result".into()))
        .and_then(|json| parse_load_result(&json))
        .map(|page_count| json!({ "page_count": page_count }));
    to_js(result)
}

/// Same as `load_pdf` for base64-encoded bytes.
#[wasm_bindgen]
pub async fn load_pdf_base64(base64_bytes: String) -> JsValue {
    match base64::engine::general_purpose::STANDARD.decode(base64_bytes) {
        Ok(bytes) => load_pdf(bytes).await,
        Err(e) => JsValue::from_str(
            &json!({"error": format!("base64 decode failed: {:?}", e)}).to_string(),
        ),
    }
}

/// Installs the console logger at `level` ("info" when absent or invalid).
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) {
    let level = level
        .and_then(|l| l.parse().ok())
        .unwrap_or(log::LevelFilter::Info);
    logging::init(level);
}
