//! Human and machine readable summaries of a run.

use std::fmt::Write as _;

use crate::engine::{FileOutcome, FileStatus, Mode, RunOutcome};
use crate::error::OperationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Plain,
    Json,
}

/// Render `outcome` for stdout. With `quiet`, plain output drops the
/// per-file lines and keeps only diffs and the summary.
pub fn render_report(
    outcome: &RunOutcome,
    format: ReportFormat,
    quiet: bool,
) -> OperationResult<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        ReportFormat::Plain => Ok(render_plain(outcome, quiet)),
    }
}

fn render_plain(outcome: &RunOutcome, quiet: bool) -> String {
    let mut out = String::new();

    for file in &outcome.files {
        if let Some(diff) = &file.diff {
            out.push_str(diff);
            if !diff.ends_with('\n') {
                out.push('\n');
            }
            continue;
        }
        if quiet || file.status == FileStatus::Unchanged {
            continue;
        }
        let _ = writeln!(out, "{}", file_line(file));
    }

    let verb = match outcome.mode {
        Mode::Write => "updated",
        Mode::Check | Mode::Diff => "would update",
    };
    let _ = writeln!(
        out,
        "{} of {} {} {}",
        outcome.changed,
        outcome.files.len(),
        if outcome.files.len() == 1 { "file" } else { "files" },
        verb
    );
    out
}

fn file_line(file: &FileOutcome) -> String {
    let status = match file.status {
        FileStatus::Updated => "updated",
        FileStatus::WouldUpdate => "would update",
        FileStatus::Unchanged => "unchanged",
    };
    let kinds = file
        .callouts
        .iter()
        .map(|callout| callout.kind.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: {} ({})", file.path.display(), status, kinds)
}
