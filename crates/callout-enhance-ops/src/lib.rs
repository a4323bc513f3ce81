//! File and site level operations: scanning, per-page enhancement, diffs,
//! atomic writes and run reports.

pub mod diff;
pub mod engine;
pub mod error;
pub mod fs;
pub mod report;
pub mod scan;

pub use engine::{
    process_source, CalloutSummary, FileOutcome, FileStatus, Mode, Operations, RunOptions,
    RunOutcome, SourceOutcome,
};
pub use error::{ExitCode, OperationError, OperationResult};
pub use report::{render_report, ReportFormat};
pub use scan::Scope;
