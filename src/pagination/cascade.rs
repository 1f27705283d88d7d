//! The pagination cascade as an explicit measure/mutate state machine.
//!
//! Each page is processed in two steps: a measure step reads geometry
//! (no mutation), then a mutate step applies the detector's verdict. A mutate
//! step that creates a continuation page hands that page to the next measure
//! step, one level deeper. The host can run steps back to back or yield to its
//! layout engine between them.

use crate::config::PaginationConfig;
use crate::document::{BlockId, PageId, ReportDocument};
use crate::error::{PaginateError, Result};
use crate::layout::{measure_page, Measure, PageGeometry};
use crate::pagination::detect::{Detector, Overflow};
use crate::pagination::factory;
use crate::pagination::split::split_page;

/// How the bottom boundary of a page is derived from its geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deadline {
    /// Top of the bottom-fixed block, else the top of the marker block, else
    /// frame height minus the margin
    BottomFixed {
        marker: Option<BlockId>,
        fallback_margin: f32,
    },
    /// Sanitized frame height minus the margin
    Frame { margin: f32 },
}

impl Deadline {
    pub fn resolve(&self, geometry: &PageGeometry, config: &PaginationConfig) -> f32 {
        match *self {
            Deadline::BottomFixed { marker, fallback_margin } => geometry
                .bottom_fixed_top
                // content may reach the marker's top, so the detector's slack is added back
                .or_else(|| {
                    marker
                        .and_then(|id| geometry.get(id))
                        .map(|b| b.top + config.overflow_margin)
                })
                .unwrap_or(geometry.frame_height - fallback_margin),
            Deadline::Frame { margin } => config.sanitize_frame_height(geometry.frame_height) - margin,
        }
    }
}

/// A page waiting to be measured
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPage {
    pub page: PageId,
    pub number: u32,
    pub depth: u32,
    pub deadline: Deadline,
    /// Section title to repeat if this page overflows
    pub active_title: Option<BlockId>,
    /// Explicit candidates; `None` means every flow block of the page
    pub candidates: Option<Vec<BlockId>>,
}

impl PendingPage {
    pub fn new(page: PageId, number: u32, deadline: Deadline) -> Self {
        Self {
            page,
            number,
            depth: 0,
            deadline,
            active_title: None,
            candidates: None,
        }
    }

    pub fn with_active_title(mut self, title: Option<BlockId>) -> Self {
        self.active_title = title;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<BlockId>) -> Self {
        self.candidates = Some(candidates);
        self
    }
}

/// Geometry snapshot taken by a measure step
#[derive(Debug, Clone)]
struct MeasuredPage {
    pending: PendingPage,
    candidates: Vec<BlockId>,
    geometry: PageGeometry,
    deadline: f32,
    /// Index of the first candidate that is not a repeated title
    anchor: usize,
}

/// Where a cascade came to rest
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub last_page: PageId,
    pub last_number: u32,
    pub pages_created: usize,
    pub splits: usize,
    /// Section title in effect at the end of the last page
    pub active_title: Option<BlockId>,
}

#[derive(Debug)]
enum State {
    Measure(PendingPage),
    Mutate(MeasuredPage),
    Settled(CascadeOutcome),
    Aborted,
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeStep {
    Continue,
    Settled(CascadeOutcome),
}

/// One pagination cascade, starting from a single page
#[derive(Debug)]
pub struct Cascade {
    state: State,
    pages_created: usize,
    splits: usize,
}

impl Cascade {
    pub fn new(start: PendingPage) -> Self {
        Self {
            state: State::Measure(start),
            pages_created: 0,
            splits: 0,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled(_))
    }

    /// Advance by one measure or mutate step
    pub fn step<M: Measure + ?Sized>(
        &mut self,
        doc: &mut ReportDocument,
        measure: &M,
        config: &PaginationConfig,
    ) -> Result<CascadeStep> {
        match std::mem::replace(&mut self.state, State::Aborted) {
            State::Measure(pending) => self.measure_step(pending, doc, measure, config),
            State::Mutate(measured) => self.mutate_step(measured, doc, measure, config),
            State::Settled(outcome) => {
                self.state = State::Settled(outcome.clone());
                Ok(CascadeStep::Settled(outcome))
            }
            State::Aborted => Err(PaginateError::Aborted),
        }
    }

    /// Run steps until the cascade settles
    pub fn run<M: Measure + ?Sized>(
        mut self,
        doc: &mut ReportDocument,
        measure: &M,
        config: &PaginationConfig,
    ) -> Result<CascadeOutcome> {
        loop {
            if let CascadeStep::Settled(outcome) = self.step(doc, measure, config)? {
                return Ok(outcome);
            }
        }
    }

    fn measure_step<M: Measure + ?Sized>(
        &mut self,
        pending: PendingPage,
        doc: &ReportDocument,
        measure: &M,
        config: &PaginationConfig,
    ) -> Result<CascadeStep> {
        if pending.depth > config.max_depth {
            log::warn!(
                "pagination depth {} exceeds limit {} at page {}",
                pending.depth,
                config.max_depth,
                pending.page
            );
            return Err(PaginateError::DepthExceeded {
                depth: pending.depth,
                limit: config.max_depth,
            });
        }

        let candidates = match &pending.candidates {
            Some(candidates) => candidates.clone(),
            None => doc.flow_blocks(pending.page)?,
        };
        if candidates.is_empty() {
            log::debug!("page {} has no candidates", pending.page);
            let title = pending.active_title;
            return Ok(self.settle(&pending, title));
        }

        let geometry = measure_page(doc, pending.page, measure)?;
        let deadline = pending.deadline.resolve(&geometry, config);
        let anchor = candidates
            .iter()
            .take_while(|id| doc.block(**id).map(|b| b.is_repeated()).unwrap_or(false))
            .count();

        log::trace!(
            "measured page {} (depth {}): {} candidates, deadline {}",
            pending.page,
            pending.depth,
            candidates.len(),
            deadline
        );

        self.state = State::Mutate(MeasuredPage {
            pending,
            candidates,
            geometry,
            deadline,
            anchor,
        });
        Ok(CascadeStep::Continue)
    }

    fn mutate_step<M: Measure + ?Sized>(
        &mut self,
        measured: MeasuredPage,
        doc: &mut ReportDocument,
        measure: &M,
        config: &PaginationConfig,
    ) -> Result<CascadeStep> {
        let MeasuredPage {
            pending,
            candidates,
            geometry,
            deadline,
            anchor,
        } = measured;

        let detection = Detector::new(doc, measure, config).detect(
            &candidates,
            &geometry,
            deadline,
            anchor,
            pending.active_title,
        )?;
        if detection.overflow == Overflow::Fits {
            return Ok(self.settle(&pending, detection.active_title));
        }

        let outcome = split_page(
            doc,
            pending.page,
            pending.number,
            &candidates,
            detection.overflow,
            measure,
            config,
        )?;
        if outcome.is_empty() {
            return Ok(self.settle(&pending, detection.active_title));
        }

        let number = pending.number + 1;
        let page = factory::create_continuation_page(doc, pending.page, number)?;
        factory::fill_continuation(doc, page, detection.active_title, &outcome.moved)?;

        self.pages_created += 1;
        if outcome.table.is_some() {
            self.splits += 1;
        }
        log::debug!(
            "moved {} blocks from page {} to page {}",
            outcome.moved.len(),
            pending.page,
            page
        );

        self.state = State::Measure(PendingPage {
            page,
            number,
            depth: pending.depth + 1,
            deadline: Deadline::Frame {
                margin: config.continuation_margin,
            },
            active_title: detection.active_title,
            candidates: None,
        });
        Ok(CascadeStep::Continue)
    }

    fn settle(&mut self, pending: &PendingPage, active_title: Option<BlockId>) -> CascadeStep {
        let outcome = CascadeOutcome {
            last_page: pending.page,
            last_number: pending.number,
            pages_created: self.pages_created,
            splits: self.splits,
            active_title,
        };
        self.state = State::Settled(outcome.clone());
        CascadeStep::Settled(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, BlockRole, PageRole, Title};
    use crate::layout::{BlockBox, FixedMeasure};
    use pretty_assertions::assert_eq;

    fn para(text: &str) -> BlockKind {
        BlockKind::Paragraph {
            text: text.to_string(),
        }
    }

    fn frame_page(heights: &[f32]) -> (ReportDocument, PageId, Vec<BlockId>, FixedMeasure) {
        let mut doc = ReportDocument::new();
        let page = doc.push_page(2, PageRole::Section);
        let mut measure = FixedMeasure::new();
        let ids = heights
            .iter()
            .map(|&h| {
                let id = doc.push_block(page, para("p"), BlockRole::Flow).unwrap();
                measure.set_block_height(id, h);
                id
            })
            .collect();
        (doc, page, ids, measure)
    }

    #[test]
    fn test_steps_alternate_measure_and_mutate() {
        let (mut doc, page, _, measure) = frame_page(&[400.0, 400.0, 400.0]);
        let config = PaginationConfig::default();
        let mut cascade = Cascade::new(PendingPage::new(page, 2, Deadline::Frame { margin: 5.0 }));

        // measure: nothing moves yet
        assert_eq!(cascade.step(&mut doc, &measure, &config).unwrap(), CascadeStep::Continue);
        assert_eq!(doc.page_count(), 1);
        // mutate: third block leaves
        assert_eq!(cascade.step(&mut doc, &measure, &config).unwrap(), CascadeStep::Continue);
        assert_eq!(doc.page_count(), 2);

        let outcome = cascade.run(&mut doc, &measure, &config).unwrap();
        assert_eq!(outcome.pages_created, 1);
        assert_eq!(outcome.last_number, 3);
        assert_eq!(doc.page_order()[1], outcome.last_page);
    }

    #[test]
    fn test_fitting_page_settles_without_mutation() {
        let (mut doc, page, ids, measure) = frame_page(&[100.0, 100.0]);
        let config = PaginationConfig::default();
        let version = doc.version();

        let outcome = Cascade::new(PendingPage::new(page, 2, Deadline::Frame { margin: 5.0 }))
            .run(&mut doc, &measure, &config)
            .unwrap();

        assert_eq!(outcome.pages_created, 0);
        assert_eq!(outcome.last_page, page);
        assert_eq!(doc.version(), version);
        assert_eq!(doc.page(page).unwrap().blocks(), ids.as_slice());
    }

    #[test]
    fn test_runaway_cascade_aborts_at_depth_limit() {
        let mut doc = ReportDocument::new();
        let page = doc.push_page(1, PageRole::Section);
        let mut measure = FixedMeasure::new().with_frame_height(500.0);
        for _ in 0..40 {
            let id = doc.push_block(page, para("p"), BlockRole::Flow).unwrap();
            measure.set_block_height(id, 600.0);
        }
        let config = PaginationConfig::default();

        let err = Cascade::new(PendingPage::new(page, 1, Deadline::Frame { margin: 5.0 }))
            .run(&mut doc, &measure, &config)
            .unwrap_err();
        assert!(matches!(err, PaginateError::DepthExceeded { depth: 21, limit: 20 }));
        assert_eq!(doc.page_count(), 22);
    }

    #[test]
    fn test_step_after_abort_is_an_error() {
        let mut doc = ReportDocument::new();
        let page = doc.push_hollow_page(1, PageRole::Section);
        let config = PaginationConfig::default();
        let measure = FixedMeasure::new();
        let mut cascade = Cascade::new(PendingPage::new(page, 1, Deadline::Frame { margin: 5.0 }));

        assert!(cascade.step(&mut doc, &measure, &config).unwrap_err().is_structural());
        assert!(matches!(
            cascade.step(&mut doc, &measure, &config),
            Err(PaginateError::Aborted)
        ));
    }

    #[test]
    fn test_bottom_fixed_deadline_and_fallback() {
        let config = PaginationConfig::default();
        let mut geometry = PageGeometry {
            frame_height: 1100.0,
            boxes: Vec::new(),
            bottom_fixed_top: Some(800.0),
        };
        let rule = Deadline::BottomFixed {
            marker: None,
            fallback_margin: 200.0,
        };
        assert_eq!(rule.resolve(&geometry, &config), 800.0);
        geometry.bottom_fixed_top = None;
        assert_eq!(rule.resolve(&geometry, &config), 900.0);

        let marker = BlockId(7);
        geometry.boxes.push(BlockBox {
            id: marker,
            top: 640.0,
            height: 120.0,
        });
        let rule = Deadline::BottomFixed {
            marker: Some(marker),
            fallback_margin: 200.0,
        };
        assert_eq!(rule.resolve(&geometry, &config), 645.0);
        geometry.bottom_fixed_top = Some(800.0);
        assert_eq!(rule.resolve(&geometry, &config), 800.0);

        // implausible frame falls back before the margin applies
        assert_eq!(Deadline::Frame { margin: 50.0 }.resolve(&geometry, &config), 910.0);
    }

    #[test]
    fn test_title_repeated_on_each_continuation() {
        let mut doc = ReportDocument::new();
        let page = doc.push_page(2, PageRole::Section);
        let title = doc
            .push_block(page, BlockKind::SectionTitle(Title::new("Unknown significance")), BlockRole::Flow)
            .unwrap();
        let mut measure = FixedMeasure::new();
        measure.default_block_height = 300.0;
        for _ in 0..6 {
            doc.push_block(page, para("v"), BlockRole::Flow).unwrap();
        }
        let config = PaginationConfig::default();

        let outcome = Cascade::new(
            PendingPage::new(page, 2, Deadline::Frame { margin: 5.0 }).with_active_title(Some(title)),
        )
        .run(&mut doc, &measure, &config)
        .unwrap();

        assert!(outcome.pages_created >= 2);
        for &id in &doc.page_order()[1..] {
            let first = doc.page(id).unwrap().blocks()[0];
            assert_eq!(doc.block(first).unwrap().repeat_of, Some(title));
        }
    }
}
