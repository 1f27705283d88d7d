//! A complete pagination run: primary flow, then the dedicated section, then
//! numbering and the trailing block.

use crate::config::PaginationConfig;
use crate::document::{BlockId, PageId, PageRole, ReportDocument};
use crate::error::PaginateError;
use crate::layout::Measure;
use crate::pagination::cascade::{Cascade, CascadeOutcome, CascadeStep};
use crate::pagination::merge::{self, SectionPass};
use crate::pagination::numbering::finalize_numbering;
use crate::pagination::primary::prepare_primary_pass;
use serde_json::json;

/// What a finished run did
#[derive(Debug, Default)]
pub struct RunSummary {
    pub pages_created: usize,
    pub tables_split: usize,
    pub split_groups: usize,
    /// Whether the dedicated section was merged into the primary flow
    pub merged: bool,
    pub page_count: usize,
    /// Error that cut the run short; numbering and completion still ran
    pub aborted: Option<PaginateError>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    fn absorb(&mut self, outcome: &CascadeOutcome) {
        self.pages_created += outcome.pages_created;
        self.tables_split += outcome.splits;
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "pagesCreated": self.pages_created,
            "tablesSplit": self.tables_split,
            "splitGroups": self.split_groups,
            "merged": self.merged,
            "pageCount": self.page_count,
            "aborted": self.aborted.as_ref().map(|err| err.to_string()),
        })
    }
}

/// Progress reported by [`PaginationRun::step`]
#[derive(Debug)]
pub enum RunStatus {
    /// More steps remain
    Pending,
    /// The run just finished; reported exactly once
    Finished(RunSummary),
    /// The run finished earlier
    Idle,
}

#[derive(Debug)]
enum Phase {
    Primary,
    PrimaryCascade { cascade: Cascade, primary: PageId },
    Section { active_title: Option<BlockId> },
    SectionCascade(Cascade),
    Finish,
    Done,
}

/// Stepwise pagination of a whole report
#[derive(Debug)]
pub struct PaginationRun {
    config: PaginationConfig,
    phase: Phase,
    summary: RunSummary,
    trailing: Option<(BlockId, PageId)>,
}

impl PaginationRun {
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            phase: Phase::Primary,
            summary: RunSummary::default(),
            trailing: None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Perform one bounded unit of work.
    ///
    /// Cascades advance one measure or mutate step per call, so a host can let
    /// its layout engine commit geometry between calls.
    pub fn step<M: Measure + ?Sized>(&mut self, doc: &mut ReportDocument, measure: &M) -> RunStatus {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Primary => {
                self.phase = match prepare_primary_pass(doc, &self.config) {
                    Ok(start) => {
                        let primary = start.page;
                        Phase::PrimaryCascade {
                            cascade: Cascade::new(start),
                            primary,
                        }
                    }
                    Err(err) => {
                        log::warn!("primary pass skipped: {err}");
                        Phase::Section { active_title: None }
                    }
                };
                RunStatus::Pending
            }
            Phase::PrimaryCascade { mut cascade, primary } => {
                self.phase = match cascade.step(doc, measure, &self.config) {
                    Ok(CascadeStep::Continue) => Phase::PrimaryCascade { cascade, primary },
                    Ok(CascadeStep::Settled(outcome)) => {
                        self.summary.absorb(&outcome);
                        Phase::Section {
                            active_title: outcome.active_title,
                        }
                    }
                    Err(err) if err.is_structural() => {
                        log::warn!("primary cascade stopped on page {primary}: {err}");
                        Phase::Section { active_title: None }
                    }
                    Err(err) => self.abort(err),
                };
                RunStatus::Pending
            }
            Phase::Section { active_title } => {
                self.phase = match self.start_section(doc, active_title) {
                    Ok(pass) => {
                        self.summary.merged = pass.merged;
                        self.trailing = pass.trailing.map(|block| (block, pass.tail_anchor));
                        Phase::SectionCascade(Cascade::new(pass.start))
                    }
                    Err(PaginateError::MissingPage { role: PageRole::Section }) => {
                        log::debug!("no dedicated section page");
                        Phase::Finish
                    }
                    Err(err) => {
                        log::warn!("section pass skipped: {err}");
                        Phase::Finish
                    }
                };
                RunStatus::Pending
            }
            Phase::SectionCascade(mut cascade) => {
                self.phase = match cascade.step(doc, measure, &self.config) {
                    Ok(CascadeStep::Continue) => Phase::SectionCascade(cascade),
                    Ok(CascadeStep::Settled(outcome)) => {
                        self.summary.absorb(&outcome);
                        Phase::Finish
                    }
                    Err(err) if err.is_structural() => {
                        log::warn!("section cascade stopped: {err}");
                        Phase::Finish
                    }
                    Err(err) => self.abort(err),
                };
                RunStatus::Pending
            }
            Phase::Finish => {
                let summary = self.finish(doc);
                RunStatus::Finished(summary)
            }
            Phase::Done => RunStatus::Idle,
        }
    }

    /// Step until the run finishes. `None` if it had already finished.
    pub fn run_to_end<M: Measure + ?Sized>(&mut self, doc: &mut ReportDocument, measure: &M) -> Option<RunSummary> {
        loop {
            match self.step(doc, measure) {
                RunStatus::Pending => continue,
                RunStatus::Finished(summary) => return Some(summary),
                RunStatus::Idle => return None,
            }
        }
    }

    /// Merge into the primary flow when it overflowed, else paginate the
    /// section page where it stands
    fn start_section(
        &self,
        doc: &mut ReportDocument,
        active_title: Option<BlockId>,
    ) -> crate::error::Result<SectionPass> {
        let primary = doc.first_page_with_role(PageRole::Primary);
        let overflowed = primary
            .and_then(|page| doc.next_page(page))
            .and_then(|next| doc.page(next))
            .map(|page| page.role.is_continuation())
            .unwrap_or(false);

        match primary {
            Some(primary) if overflowed => merge::merge_into_flow(doc, primary, active_title, &self.config),
            _ => merge::prepare_section_pass(doc, &self.config),
        }
    }

    fn abort(&mut self, err: PaginateError) -> Phase {
        log::error!("pagination aborted: {err}");
        self.summary.aborted = Some(err);
        Phase::Finish
    }

    fn finish(&mut self, doc: &mut ReportDocument) -> RunSummary {
        self.summary.split_groups = finalize_numbering(doc);

        if let Some((block, anchor)) = self.trailing.take() {
            if let Err(err) = merge::reattach_trailing(doc, block, anchor) {
                log::warn!("trailing block {block} could not be placed: {err}");
            }
        }

        self.summary.page_count = doc.page_count();
        let summary = std::mem::take(&mut self.summary);
        log::info!(
            "pagination finished: {} pages, {} created, {} tables split{}",
            summary.page_count,
            summary.pages_created,
            summary.tables_split,
            if summary.is_complete() { "" } else { " (aborted)" }
        );
        summary
    }
}

/// Completion callback that can fire at most once
pub struct Completion<F: FnOnce(&RunSummary)> {
    callback: F,
}

impl<F: FnOnce(&RunSummary)> Completion<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    pub fn fire(self, summary: &RunSummary) {
        (self.callback)(summary)
    }
}
