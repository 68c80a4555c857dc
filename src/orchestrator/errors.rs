use std::path::PathBuf;

use crate::{estimation::EstimationError, market::DataError, prepare::PrepareError};

pub type RunResult<T> = Result<T, RunError>;

/// Failures of a comparison run. Configuration problems are reported before
/// any data is read.
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// The run description is empty or whitespace.
    MissingDescription,

    /// An output or data directory for this stamp already exists.
    DirectoryExists {
        path: PathBuf,
    },

    Io {
        path: PathBuf,
        message: String,
    },

    Csv {
        path: PathBuf,
        message: String,
    },

    /// Invalid configuration file, value, or override.
    Config {
        message: String,
    },

    Prepare(PrepareError),

    Estimation(EstimationError),
}

impl std::error::Error for RunError {}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::MissingDescription => {
                write!(f, "A non-empty run description is required")
            }
            RunError::DirectoryExists { path } => {
                write!(f, "Directory already exists: {}", path.display())
            }
            RunError::Io { path, message } => {
                write!(f, "I/O error on {}: {message}", path.display())
            }
            RunError::Csv { path, message } => {
                write!(f, "CSV error in {}: {message}", path.display())
            }
            RunError::Config { message } => write!(f, "Configuration error: {message}"),
            RunError::Prepare(e) => write!(f, "Data preparation failed: {e}"),
            RunError::Estimation(e) => write!(f, "Estimation failed: {e}"),
        }
    }
}

impl From<DataError> for RunError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Io { path, message } => RunError::Io { path, message },
            DataError::Csv { path, message } => RunError::Csv { path, message },
        }
    }
}

impl From<PrepareError> for RunError {
    fn from(err: PrepareError) -> Self {
        RunError::Prepare(err)
    }
}

impl From<EstimationError> for RunError {
    fn from(err: EstimationError) -> Self {
        RunError::Estimation(err)
    }
}
