//! Trigger coalescing and re-runnable pagination of one report

use crate::document::ReportDocument;
use crate::layout::Measure;
use crate::pagination::run::{PaginationRun, RunStatus, RunSummary};
use crate::Paginator;
use std::fmt;
use std::str::FromStr;

/// Host event requesting pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Load,
    Resize,
    BeforePrint,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Load => "load",
            Trigger::Resize => "resize",
            Trigger::BeforePrint => "beforeprint",
        };
        f.write_str(name)
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "load" => Ok(Trigger::Load),
            "resize" => Ok(Trigger::Resize),
            "beforeprint" | "before-print" | "print" => Ok(Trigger::BeforePrint),
            other => Err(format!("unknown pagination trigger: {other}")),
        }
    }
}

/// Whether a request started a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Started,
    /// A run is in progress; the request will be served by one follow-up run
    Deferred,
}

/// Allows one run at a time; requests arriving meanwhile collapse into a
/// single follow-up run
#[derive(Debug, Default)]
pub struct TriggerGate {
    running: Option<Trigger>,
    pending: Option<Trigger>,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, trigger: Trigger) -> Admission {
        if self.running.is_some() {
            log::debug!("{trigger} requested during a run, deferred");
            self.pending = Some(trigger);
            Admission::Deferred
        } else {
            self.running = Some(trigger);
            Admission::Started
        }
    }

    /// Mark the current run finished; returns the trigger of the follow-up run, if any
    pub fn finish(&mut self) -> Option<Trigger> {
        self.running = self.pending.take();
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

/// A report that can be paginated repeatedly.
///
/// Each run starts from the pristine source, so re-pagination after a resize
/// never compounds earlier splits.
pub struct ReportSession<M> {
    paginator: Paginator,
    measure: M,
    source: ReportDocument,
    document: ReportDocument,
    run: Option<PaginationRun>,
    /// Follow-up run admitted by the gate, started on the next step
    queued: Option<Trigger>,
    gate: TriggerGate,
    runs_completed: usize,
}

impl<M: Measure> ReportSession<M> {
    pub fn new(paginator: Paginator, measure: M, source: ReportDocument) -> Self {
        Self {
            paginator,
            measure,
            document: source.clone(),
            source,
            run: None,
            queued: None,
            gate: TriggerGate::new(),
            runs_completed: 0,
        }
    }

    pub fn request(&mut self, trigger: Trigger) -> Admission {
        let admission = self.gate.request(trigger);
        if admission == Admission::Started {
            self.begin(trigger);
        }
        admission
    }

    fn begin(&mut self, trigger: Trigger) {
        log::info!("pagination run started by {trigger}");
        self.document = self.source.clone();
        self.run = Some(self.paginator.start());
    }

    /// Advance the active run by one step. Returns the summary when a run finishes.
    ///
    /// The document keeps the finished layout until the following step, so a
    /// completion handler always sees the result of the run it reports.
    pub fn step(&mut self) -> Option<RunSummary> {
        if self.run.is_none() {
            if let Some(next) = self.queued.take() {
                self.begin(next);
            }
        }
        let run = self.run.as_mut()?;
        match run.step(&mut self.document, &self.measure) {
            RunStatus::Pending => None,
            RunStatus::Finished(summary) => {
                self.run = None;
                self.runs_completed += 1;
                self.queued = self.gate.finish();
                if let Some(next) = self.queued {
                    log::debug!("follow-up run for {next} queued");
                }
                Some(summary)
            }
            RunStatus::Idle => {
                self.run = None;
                None
            }
        }
    }

    /// Step until no run is active, reporting each finished run
    pub fn run_until_idle(&mut self, mut on_complete: impl FnMut(&RunSummary)) -> usize {
        let mut finished = 0;
        while self.is_busy() {
            if let Some(summary) = self.step() {
                on_complete(&summary);
                finished += 1;
            }
        }
        finished
    }

    pub fn is_busy(&self) -> bool {
        self.run.is_some() || self.queued.is_some()
    }

    pub fn runs_completed(&self) -> usize {
        self.runs_completed
    }

    pub fn document(&self) -> &ReportDocument {
        &self.document
    }

    pub fn source(&self) -> &ReportDocument {
        &self.source
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Geometry changes take effect from the next measure step
    pub fn measure_mut(&mut self) -> &mut M {
        &mut self.measure
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }
}
