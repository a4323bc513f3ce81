//! Locate rendered pages that fall inside the configured scope.

use std::io;
use std::path::{Path, PathBuf};

use callout_enhance_config::Config;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{OperationError, OperationResult};

/// Scope filter built from project and scan settings.
#[derive(Clone)]
pub struct Scope {
    config: Config,
}

impl Scope {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether `path` should be processed. Patterns are matched against the
    /// path relative to the project root; paths outside the root are matched
    /// as given.
    pub fn is_path_in_scope(&self, path: &Path) -> bool {
        let relative = self.relative_path(path);

        if self.config.project.exclude.is_match(&relative)
            || self.config.scan.exclude.is_match(&relative)
        {
            return false;
        }

        self.config.scan.include.is_match(&relative)
    }

    /// Expand `paths` into the sorted list of in-scope files. Directories are
    /// walked recursively; explicitly named files are kept even when the
    /// include patterns would not pick them up. An empty `paths` scans the
    /// project root.
    pub fn collect(&self, paths: &[PathBuf]) -> OperationResult<Vec<PathBuf>> {
        let roots = if paths.is_empty() {
            vec![self.config.project.root.clone()]
        } else {
            paths.iter().map(|path| self.absolute_path(path)).collect()
        };

        let mut files = Vec::new();
        for root in roots {
            if root.is_file() {
                files.push(root);
                continue;
            }

            if !root.is_dir() {
                return Err(OperationError::InvalidInput(format!(
                    "path {} does not exist",
                    root.display()
                )));
            }

            let walker = WalkDir::new(&root)
                .follow_links(self.config.scan.follow_links)
                .sort_by_file_name();

            for entry in walker {
                let entry = entry.map_err(|err| {
                    let path = err.path().map(Path::to_path_buf).unwrap_or(root.clone());
                    let source = err.into_io_error().unwrap_or_else(|| {
                        io::Error::new(io::ErrorKind::Other, "filesystem loop detected")
                    });
                    OperationError::io(path, source)
                })?;

                if entry.file_type().is_file() && self.is_path_in_scope(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }

        files.sort();
        files.dedup();
        debug!(count = files.len(), "collected pages");
        Ok(files)
    }

    fn absolute_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.sources.working_directory.join(path)
        }
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        let absolute = self.absolute_path(path);
        absolute
            .strip_prefix(&self.config.project.root)
            .map(Path::to_path_buf)
            .unwrap_or(absolute)
    }
}
