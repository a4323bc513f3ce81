use std::io;
use std::path::PathBuf;

use callout_enhance_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Changes = 1,
    InvalidArguments = 3,
    Io = 4,
    Config = 5,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::Changes),
            3 => Some(Self::InvalidArguments),
            4 => Some(Self::Io),
            5 => Some(Self::Config),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("i/o error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{} is not valid UTF-8", path.display())]
    InvalidEncoding { path: PathBuf },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

impl OperationError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io { .. } | Self::InvalidEncoding { .. } | Self::Report(_) => ExitCode::Io,
            Self::InvalidInput(_) => ExitCode::InvalidArguments,
            Self::Config(_) => ExitCode::Config,
        }
    }
}

pub type OperationResult<T> = Result<T, OperationError>;
