//! Geometry read back from the host's committed layout

use crate::document::{Block, Page, Row, Table, Title};
use crate::layout::{Measure, TextMetricsMeasure};
use js_sys::{Array, Function, Reflect};
use smallvec::SmallVec;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Host callbacks, each optional. Ids match the `data-block`, `data-row` and
/// `data-page` attributes of the rendered HTML.
#[derive(Debug, Clone, Default)]
pub struct LayoutCallbacks {
    /// `(blockId) => number`
    pub block_height: Option<Function>,
    /// `(rowId) => number`
    pub row_height: Option<Function>,
    /// `(firstRowId) => number`
    pub header_height: Option<Function>,
    /// `(firstRowId) => number[]`
    pub column_widths: Option<Function>,
    /// `(pageId) => number`
    pub frame_height: Option<Function>,
}

impl LayoutCallbacks {
    /// Read `blockHeight`, `rowHeight`, `headerHeight`, `columnWidths` and
    /// `frameHeight` from a JS object. Missing or non-function members are skipped.
    pub fn from_object(object: &JsValue) -> Result<Self, JsValue> {
        let get = |name: &str| -> Result<Option<Function>, JsValue> {
            let value = Reflect::get(object, &JsValue::from_str(name))?;
            Ok(value.dyn_into::<Function>().ok())
        };
        Ok(Self {
            block_height: get("blockHeight")?,
            row_height: get("rowHeight")?,
            header_height: get("headerHeight")?,
            column_widths: get("columnWidths")?,
            frame_height: get("frameHeight")?,
        })
    }
}

fn call_number(callback: &Function, id: u64) -> Option<f32> {
    match callback.call1(&JsValue::NULL, &JsValue::from_f64(id as f64)) {
        Ok(value) => match value.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => Some(n as f32),
            _ => {
                log::warn!("layout callback returned a non-numeric height for {id}");
                None
            }
        },
        Err(_) => {
            log::warn!("layout callback threw for {id}");
            None
        }
    }
}

/// Committed-layout geometry with the text estimator as fallback.
///
/// The host renders `toHtml()` and lets the browser lay it out between steps;
/// each callback then reports the element's box. Anything the host does not
/// provide, or fails to report, is estimated.
#[derive(Debug, Clone, Default)]
pub struct HostMeasure {
    pub estimator: TextMetricsMeasure,
    pub callbacks: LayoutCallbacks,
}

impl HostMeasure {
    pub fn new(estimator: TextMetricsMeasure) -> Self {
        Self {
            estimator,
            callbacks: LayoutCallbacks::default(),
        }
    }

    pub fn is_host_backed(&self) -> bool {
        self.callbacks.block_height.is_some()
    }
}

impl Measure for HostMeasure {
    fn block_height(&self, block: &Block) -> f32 {
        self.callbacks
            .block_height
            .as_ref()
            .and_then(|f| call_number(f, block.id.0))
            .unwrap_or_else(|| self.estimator.block_height(block))
    }

    fn title_height(&self, title: &Title) -> f32 {
        self.estimator.title_height(title)
    }

    fn header_height(&self, table: &Table) -> f32 {
        let first = table.body.first().map(|row| row.id.0);
        self.callbacks
            .header_height
            .as_ref()
            .zip(first)
            .and_then(|(f, id)| call_number(f, id))
            .unwrap_or_else(|| self.estimator.header_height(table))
    }

    fn row_height(&self, table: &Table, row: &Row) -> f32 {
        self.callbacks
            .row_height
            .as_ref()
            .and_then(|f| call_number(f, row.id.0))
            .unwrap_or_else(|| self.estimator.row_height(table, row))
    }

    fn column_widths(&self, table: &Table) -> SmallVec<[f32; 8]> {
        if let Some(pinned) = table.pinned_widths() {
            return pinned;
        }
        let reported = match (&self.callbacks.column_widths, table.body.first()) {
            (Some(f), Some(row)) => f.call1(&JsValue::NULL, &JsValue::from_f64(row.id.0 as f64)).ok(),
            _ => None,
        };
        let widths: Option<SmallVec<[f32; 8]>> = reported.filter(Array::is_array).and_then(|value| {
            Array::from(&value)
                .iter()
                .map(|w| w.as_f64().filter(|w| w.is_finite()).map(|w| w as f32))
                .collect()
        });
        match widths {
            Some(widths) if !widths.is_empty() => widths,
            _ => self.estimator.column_widths(table),
        }
    }

    fn frame_height(&self, page: &Page) -> f32 {
        self.callbacks
            .frame_height
            .as_ref()
            .and_then(|f| call_number(f, page.id.0))
            .unwrap_or_else(|| self.estimator.frame_height(page))
    }

    fn content_top(&self, page: &Page) -> f32 {
        self.estimator.content_top(page)
    }
}
