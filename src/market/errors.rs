use std::path::PathBuf;

pub type DataResult<T> = Result<T, DataError>;

/// Failures reading or writing market CSV files.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// File could not be opened, created, or flushed.
    Io { path: PathBuf, message: String },

    /// File was readable but a record did not parse or serialize.
    Csv { path: PathBuf, message: String },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io { path, message } => {
                write!(f, "I/O error on {}: {message}", path.display())
            }
            DataError::Csv { path, message } => {
                write!(f, "CSV error in {}: {message}", path.display())
            }
        }
    }
}

impl DataError {
    pub(crate) fn csv(path: &std::path::Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            DataError::Io { path: path.to_path_buf(), message: err.to_string() }
        } else {
            DataError::Csv { path: path.to_path_buf(), message: err.to_string() }
        }
    }
}
