//! WASM bindings for the paginator

mod measure;

pub use measure::{HostMeasure, LayoutCallbacks};

use crate::document::{ReportDocument, ReportInput};
use crate::layout::{FontMetrics, TextMetricsMeasure};
use crate::pagination::{Admission, ReportSession, RunSummary, Trigger};
use crate::render::render_document;
use crate::{PaginationConfig, Paginator};
use js_sys::Function;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed pagination session
#[wasm_bindgen]
pub struct WasmPaginator {
    session: ReportSession<HostMeasure>,
    last_summary: Option<String>,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Load a report (JSON) with an optional partial config (JSON)
    #[wasm_bindgen(constructor)]
    pub fn new(report_json: &str, config_json: Option<String>) -> Result<WasmPaginator, JsError> {
        let config = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => PaginationConfig::from_json(json)?,
            _ => PaginationConfig::default(),
        };
        let doc = ReportDocument::from_json(report_json)?;
        let measure = HostMeasure::new(TextMetricsMeasure::default());

        Ok(Self {
            session: ReportSession::new(Paginator::new(config), measure, doc),
            last_summary: None,
        })
    }

    /// Replace the font metrics used for height estimation
    #[wasm_bindgen(js_name = setFontMetrics)]
    pub fn set_font_metrics(&mut self, line_height: f32, char_widths: Vec<f32>, default_width: f32) {
        self.session.measure_mut().estimator.font = FontMetrics::new(line_height, char_widths, default_width);
    }

    /// Set the frame height and content width of every page
    #[wasm_bindgen(js_name = setPageGeometry)]
    pub fn set_page_geometry(&mut self, frame_height: f32, content_width: f32) {
        let estimator = &mut self.session.measure_mut().estimator;
        estimator.frame_height = frame_height;
        estimator.content_width = content_width;
    }

    /// Measure from committed layout.
    ///
    /// `callbacks` is an object with any of `blockHeight(blockId)`,
    /// `rowHeight(rowId)`, `headerHeight(firstRowId)`, `columnWidths(firstRowId)`
    /// and `frameHeight(pageId)`. Ids are the `data-block`, `data-row` and
    /// `data-page` attributes of `toHtml()`. Render the document after every
    /// step so the callbacks read the current layout.
    #[wasm_bindgen(js_name = setLayoutCallbacks)]
    pub fn set_layout_callbacks(&mut self, callbacks: &JsValue) -> Result<(), JsValue> {
        self.session.measure_mut().callbacks = LayoutCallbacks::from_object(callbacks)?;
        Ok(())
    }

    /// Return to estimated geometry
    #[wasm_bindgen(js_name = clearLayoutCallbacks)]
    pub fn clear_layout_callbacks(&mut self) {
        self.session.measure_mut().callbacks = LayoutCallbacks::default();
    }

    /// Request a run for `load`, `resize` or `beforeprint`.
    ///
    /// Returns false when a run is in progress; the request is then served by
    /// a single follow-up run.
    #[wasm_bindgen(js_name = requestPagination)]
    pub fn request_pagination(&mut self, trigger: &str) -> Result<bool, JsError> {
        let trigger: Trigger = trigger.parse().map_err(|err: String| JsError::new(&err))?;
        Ok(self.session.request(trigger) == Admission::Started)
    }

    /// Advance one step. Calls `on_complete` with the run summary (JSON) when a
    /// run finishes; returns true while work remains.
    ///
    /// With layout callbacks set, re-render and let the browser commit layout
    /// before the next call.
    pub fn step(&mut self, on_complete: &Function) -> Result<bool, JsValue> {
        if let Some(summary) = self.session.step() {
            self.complete(&summary, on_complete)?;
        }
        Ok(self.session.is_busy())
    }

    /// Run every pending step, invoking `on_complete` once per finished run
    #[wasm_bindgen(js_name = paginateNow)]
    pub fn paginate_now(&mut self, on_complete: &Function) -> Result<usize, JsValue> {
        let mut finished = 0;
        while self.session.is_busy() {
            if let Some(summary) = self.session.step() {
                self.complete(&summary, on_complete)?;
                finished += 1;
            }
        }
        Ok(finished)
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Paginated document as HTML
    #[wasm_bindgen(js_name = toHtml)]
    pub fn to_html(&self) -> String {
        render_document(self.session.document())
    }

    /// Paginated document as report JSON
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        Ok(self.session.document().to_input().to_json()?)
    }

    /// Summary of the most recent finished run (JSON)
    #[wasm_bindgen(js_name = lastSummary)]
    pub fn last_summary(&self) -> Option<String> {
        self.last_summary.clone()
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.session.document().page_count()
    }
}

impl WasmPaginator {
    fn complete(&mut self, summary: &RunSummary, on_complete: &Function) -> Result<(), JsValue> {
        let json = summary.to_json().to_string();
        self.last_summary = Some(json.clone());
        on_complete.call1(&JsValue::NULL, &JsValue::from_str(&json))?;
        Ok(())
    }

    /// Paginated document as a report description
    pub fn to_input(&self) -> ReportInput {
        self.session.document().to_input()
    }
}
