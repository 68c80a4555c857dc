//! Data-integrity failures raised while preparing market tables.
//!
//! Every variant is fatal: it signals a violated precondition in the input
//! panels or auxiliary tables, never something to skip over.

pub type PrepareResult<T> = Result<T, PrepareError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PrepareError {
    /// A join changed the number of rows.
    RowCountMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A join key has no match in an auxiliary table.
    UnmatchedKey {
        table: &'static str,
        key: String,
    },

    /// An auxiliary table lists the same key more than once.
    DuplicateKey {
        table: &'static str,
        key: String,
    },

    /// An inside share fell outside `[0, 1]`.
    ShareOutOfRange {
        market: String,
        product: String,
        share: f64,
    },

    /// The outside share of a market fell outside `(0, 1)`.
    OutsideShareOutOfRange {
        market: String,
        outside_share: f64,
    },

    /// Zero-count replacement must be finite and strictly positive.
    InvalidZmsValue {
        value: f64,
    },

    /// No rows left after the named stage.
    EmptyPanel {
        stage: &'static str,
    },

    /// `report_year_month` is not a valid `YYYYMM` value.
    InvalidReportYearMonth {
        value: i64,
    },

    /// A value required to be finite was NaN or infinite.
    NonFiniteValue {
        column: &'static str,
        key: String,
        value: f64,
    },
}

impl std::error::Error for PrepareError {}

impl std::fmt::Display for PrepareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrepareError::RowCountMismatch { stage, expected, actual } => {
                write!(f, "Row count mismatch after {stage}: expected {expected}, got {actual}")
            }
            PrepareError::UnmatchedKey { table, key } => {
                write!(f, "Unmatched key '{key}' in {table} table")
            }
            PrepareError::DuplicateKey { table, key } => {
                write!(f, "Duplicate key '{key}' in {table} table")
            }
            PrepareError::ShareOutOfRange { market, product, share } => {
                write!(
                    f,
                    "Share {share} of product '{product}' in market '{market}' is outside [0, 1]"
                )
            }
            PrepareError::OutsideShareOutOfRange { market, outside_share } => {
                write!(f, "Outside share {outside_share} in market '{market}' is outside (0, 1)")
            }
            PrepareError::InvalidZmsValue { value } => {
                write!(f, "Invalid zero-share replacement {value}: must be finite and positive")
            }
            PrepareError::EmptyPanel { stage } => write!(f, "No rows left after {stage}"),
            PrepareError::InvalidReportYearMonth { value } => {
                write!(f, "Invalid report_year_month {value}: expected YYYYMM")
            }
            PrepareError::NonFiniteValue { column, key, value } => {
                write!(f, "Non-finite {column} = {value} for '{key}'")
            }
        }
    }
}
