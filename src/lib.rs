//! Report-pager: dynamic pagination for rendered clinical reports
//!
//! This crate re-flows a report laid out as fixed-height pages:
//! - Overflow detection against each page's measured deadline
//! - Row-boundary table splitting with a duplicated, width-pinned header
//! - Continuation pages with the active section title repeated on top
//! - `(i/N)` numbering of titles split across pages
//! - Merging a trailing section into an overflowing primary flow
//!
//! Geometry comes from a [`layout::Measure`] implementation, so the same
//! cascade runs against the browser's committed layout or an estimator.

pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod pagination;
pub mod render;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use config::PaginationConfig;
pub use document::{Block, BlockId, BlockKind, BlockRole, Page, PageId, PageRole, ReportDocument, Table, Title};
pub use error::{PaginateError, Result};
pub use layout::{FixedMeasure, FontMetrics, Measure, TextMetricsMeasure};
pub use pagination::{Completion, PaginationRun, ReportSession, RunStatus, RunSummary, Trigger};

/// Entry point combining configuration with the run state machine
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Begin a stepwise run
    pub fn start(&self) -> PaginationRun {
        PaginationRun::new(self.config.clone())
    }

    /// Paginate `doc` to completion
    pub fn paginate<M: Measure + ?Sized>(&self, doc: &mut ReportDocument, measure: &M) -> RunSummary {
        self.start().run_to_end(doc, measure).unwrap_or_default()
    }

    /// Paginate `doc` and hand the summary to `on_complete` exactly once
    pub fn paginate_with<M, F>(&self, doc: &mut ReportDocument, measure: &M, on_complete: F) -> RunSummary
    where
        M: Measure + ?Sized,
        F: FnOnce(&RunSummary),
    {
        let completion = Completion::new(on_complete);
        let summary = self.paginate(doc, measure);
        completion.fire(&summary);
        summary
    }
}
