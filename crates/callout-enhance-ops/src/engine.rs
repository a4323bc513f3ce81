use std::fs;
use std::path::{Path, PathBuf};

use callout_enhance::{enhance_html, EnhanceReport};
use callout_enhance_config::Config;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::diff::build_unified_diff;
use crate::error::{ExitCode, OperationError, OperationResult};
use crate::fs::write_atomic;
use crate::scan::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Rewrite pages that contain callouts.
    Write,
    /// Report pages that would change; never writes.
    Check,
    /// Produce unified diffs; never writes.
    Diff,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub paths: Vec<PathBuf>,
    pub mode: Mode,
    /// Overrides `output.backup` from configuration when set.
    pub backup: Option<bool>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            mode: Mode::Write,
            backup: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Updated,
    WouldUpdate,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalloutSummary {
    pub kind: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub callouts: Vec<CalloutSummary>,
    #[serde(skip)]
    pub diff: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub mode: Mode,
    pub files: Vec<FileOutcome>,
    pub changed: usize,
    #[serde(skip)]
    pub exit_code: ExitCode,
}

/// Result of enhancing an in-memory page.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub output: String,
    pub callouts: Vec<CalloutSummary>,
}

impl SourceOutcome {
    pub fn changed(&self) -> bool {
        !self.callouts.is_empty()
    }
}

/// Enhance a page held in memory. Pages without callouts come back
/// byte-for-byte as they went in rather than re-serialized.
pub fn process_source(source: &str) -> SourceOutcome {
    let (rendered, report) = enhance_html(source);
    let callouts = summarize(&report);
    let output = if callouts.is_empty() {
        source.to_owned()
    } else {
        rendered
    };
    SourceOutcome { output, callouts }
}

fn summarize(report: &EnhanceReport) -> Vec<CalloutSummary> {
    report
        .callouts
        .iter()
        .map(|callout| CalloutSummary {
            kind: callout.kind.clone(),
            title: callout.title.clone(),
        })
        .collect()
}

/// A page read and transformed but not yet written.
struct PreparedPage {
    path: PathBuf,
    display_path: PathBuf,
    source: String,
    output: String,
    callouts: Vec<CalloutSummary>,
}

/// Site-level operations bound to a resolved configuration.
pub struct Operations {
    scope: Scope,
}

impl Operations {
    pub fn new(config: Config) -> Self {
        Self {
            scope: Scope::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        self.scope.config()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Enhance every in-scope page under `options.paths`.
    ///
    /// Pages are read and transformed in parallel first; nothing is written
    /// until every page has been transformed, so an unreadable page aborts
    /// the run with the site untouched. Results keep the sorted path order.
    pub fn run(&self, options: RunOptions) -> OperationResult<RunOutcome> {
        let files = self.scope.collect(&options.paths)?;
        let backup = options.backup.unwrap_or(self.config().output.backup);

        let pages = files
            .par_iter()
            .map(|path| self.prepare(path))
            .collect::<OperationResult<Vec<_>>>()?;

        let outcomes = pages
            .into_par_iter()
            .map(|page| self.apply(page, options.mode, backup))
            .collect::<OperationResult<Vec<_>>>()?;

        let changed = outcomes
            .iter()
            .filter(|outcome| outcome.status != FileStatus::Unchanged)
            .count();

        let exit_code = if options.mode == Mode::Check && changed > 0 {
            ExitCode::Changes
        } else {
            ExitCode::Success
        };

        info!(files = outcomes.len(), changed, "run complete");

        Ok(RunOutcome {
            mode: options.mode,
            files: outcomes,
            changed,
            exit_code,
        })
    }

    pub fn process_file(
        &self,
        path: &Path,
        mode: Mode,
        backup: bool,
    ) -> OperationResult<FileOutcome> {
        let page = self.prepare(path)?;
        self.apply(page, mode, backup)
    }

    fn prepare(&self, path: &Path) -> OperationResult<PreparedPage> {
        let bytes = fs::read(path).map_err(|err| OperationError::io(path, err))?;
        let source = String::from_utf8(bytes).map_err(|_| OperationError::InvalidEncoding {
            path: path.to_path_buf(),
        })?;
        let SourceOutcome { output, callouts } = process_source(&source);

        Ok(PreparedPage {
            path: path.to_path_buf(),
            display_path: self.display_path(path),
            source,
            output,
            callouts,
        })
    }

    fn apply(&self, page: PreparedPage, mode: Mode, backup: bool) -> OperationResult<FileOutcome> {
        let PreparedPage {
            path,
            display_path,
            source,
            output,
            callouts,
        } = page;

        if callouts.is_empty() {
            debug!(path = %display_path.display(), "no callouts");
            return Ok(FileOutcome {
                path: display_path,
                status: FileStatus::Unchanged,
                callouts,
                diff: None,
            });
        }

        let (status, diff) = match mode {
            Mode::Write => {
                write_atomic(&path, &output, backup)?;
                info!(path = %display_path.display(), callouts = callouts.len(), "updated");
                (FileStatus::Updated, None)
            }
            Mode::Check => (FileStatus::WouldUpdate, None),
            Mode::Diff => {
                let label = display_path.to_string_lossy();
                (
                    FileStatus::WouldUpdate,
                    build_unified_diff(&source, &output, label.as_ref()),
                )
            }
        };

        Ok(FileOutcome {
            path: display_path,
            status,
            callouts,
            diff,
        })
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        let config = self.config();
        path.strip_prefix(&config.project.root)
            .or_else(|_| path.strip_prefix(&config.sources.working_directory))
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
