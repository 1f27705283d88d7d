//! Dynamic pagination: overflow detection, table splitting, continuation
//! pages and split-title numbering

mod cascade;
mod detect;
mod factory;
mod merge;
mod numbering;
mod primary;
mod run;
mod session;
mod split;

pub use cascade::{Cascade, CascadeOutcome, CascadeStep, Deadline, PendingPage};
pub use detect::{Detection, Detector, Overflow};
pub use factory::{create_continuation_page, fill_continuation, repeat_title};
pub use merge::{merge_into_flow, prepare_section_pass, reattach_trailing, SectionPass};
pub use numbering::finalize_numbering;
pub use primary::prepare_primary_pass;
pub use run::{Completion, PaginationRun, RunStatus, RunSummary};
pub use session::{Admission, ReportSession, Trigger, TriggerGate};
pub use split::{split_page, SplitOutcome, TableSplit};
