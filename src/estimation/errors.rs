use crate::{inference::errors::InferenceError, optimization::errors::OptError};

pub type EstimationResult<T> = Result<T, EstimationError>;

/// Failures while fitting a specification to a prepared table.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// The normal-equations matrix of a design is rank deficient.
    SingularDesign {
        model: &'static str,
        rank: usize,
        columns: usize,
    },

    /// Fewer observations than columns; no residual degrees of freedom.
    InsufficientObservations {
        observations: usize,
        columns: usize,
    },

    /// The MLE solver stopped without meeting its convergence criteria.
    NonConvergence {
        iterations: usize,
        status: String,
    },

    /// A formulation names a column the table does not have.
    UnknownColumn {
        name: String,
    },

    /// Nothing to fit.
    EmptyTable,

    /// Specification index outside `1..=max`.
    InvalidSpecification {
        index: usize,
        max: usize,
    },

    /// A column cannot enter the model (non-finite value, zero share, ...).
    DegenerateColumn {
        name: String,
        row: usize,
        value: f64,
    },

    Optimization(OptError),

    Inference(InferenceError),
}

impl std::error::Error for EstimationError {}

impl std::fmt::Display for EstimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationError::SingularDesign { model, rank, columns } => {
                write!(f, "Singular {model} design: rank {rank} < {columns} columns")
            }
            EstimationError::InsufficientObservations { observations, columns } => {
                write!(f, "Insufficient observations: {observations} rows for {columns} columns")
            }
            EstimationError::NonConvergence { iterations, status } => {
                write!(f, "Estimator did not converge after {iterations} iterations: {status}")
            }
            EstimationError::UnknownColumn { name } => write!(f, "Unknown column '{name}'"),
            EstimationError::EmptyTable => write!(f, "Cannot estimate on an empty market table"),
            EstimationError::InvalidSpecification { index, max } => {
                write!(f, "Invalid specification {index}: expected 1..={max}")
            }
            EstimationError::DegenerateColumn { name, row, value } => {
                write!(f, "Column '{name}' has unusable value {value} at row {row}")
            }
            EstimationError::Optimization(e) => write!(f, "Optimization error: {e}"),
            EstimationError::Inference(e) => write!(f, "{e}"),
        }
    }
}

impl From<OptError> for EstimationError {
    fn from(err: OptError) -> Self {
        EstimationError::Optimization(err)
    }
}

impl From<InferenceError> for EstimationError {
    fn from(err: InferenceError) -> Self {
        EstimationError::Inference(err)
    }
}
