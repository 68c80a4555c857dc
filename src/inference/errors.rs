//! Error type for post-estimation inference.
//!
//! `InferenceError` covers malformed score inputs to the market-clustered
//! covariance. The alias `InferenceResult<T>` is used by every routine in
//! this module.

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Cluster scores ----
    /// Score matrix columns do not match the parameter dimension.
    ScoreDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Number of cluster weights does not match the number of score rows.
    ClusterLengthMismatch {
        scores: usize,
        weights: usize,
    },

    /// Clustered covariance needs at least two clusters.
    TooFewClusters {
        clusters: usize,
    },

    /// A score or weight entry is NaN or infinite.
    NonFiniteScore {
        row: usize,
        col: usize,
        value: f64,
    },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::ScoreDimMismatch { expected, found } => {
                write!(f, "Inference Error: score matrix has {found} columns, expected {expected}")
            }
            InferenceError::ClusterLengthMismatch { scores, weights } => write!(
                f,
                "Inference Error: {scores} cluster score rows but {weights} cluster weights"
            ),
            InferenceError::TooFewClusters { clusters } => write!(
                f,
                "Inference Error: clustered covariance needs at least 2 clusters, got {clusters}"
            ),
            InferenceError::NonFiniteScore { row, col, value } => {
                write!(f, "Inference Error: non-finite score at ({row}, {col}): {value}")
            }
        }
    }
}
