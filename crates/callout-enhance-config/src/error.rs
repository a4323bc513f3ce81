use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ConfigSource;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },

    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },

    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration:\n{0}")]
    Validation(ConfigValidationErrors),
}

/// Every problem found while resolving layers, one per line.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .0
            .iter()
            .map(|err| format!("- {err}"))
            .collect::<Vec<_>>();
        f.write_str(&lines.join("\n"))
    }
}

#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    /// Dotted key, e.g. `scan.include_patterns`.
    pub key: String,
    pub message: String,
    /// Layer that supplied the offending value.
    pub source: Option<ConfigSource>,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}
