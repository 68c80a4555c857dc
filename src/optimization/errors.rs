use argmin::core::{ArgminError, Error};

/// Result alias for the likelihood maximizer and its numerical helpers.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// The likelihood has no analytic gradient; finite differences are used.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// A gradient entry is NaN or infinite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Solver ----
    /// argmin stopped with one of its own errors; `kind` names the argmin
    /// error class.
    Solver {
        kind: &'static str,
        text: String,
    },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Logit likelihood ----
    /// Coefficient vector length does not match the number of design columns.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Coefficient vector must have finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    /// Mean utility overflowed for a product row.
    NonFiniteUtility {
        row: usize,
        value: f64,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "No analytic gradient; falling back to finite differences")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has {found} entries, expected one per coefficient ({expected})")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "tol_grad = {tol} rejected: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "tol_cost = {tol} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "max_iter = {max_iter} rejected: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of tol_grad, tol_cost, max_iter must be set")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "lbfgs_mem = {mem} rejected: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Negative log-likelihood evaluated to {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Estimated coefficient {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Solver finished without a best coefficient vector")
            }

            // ---- Solver ----
            OptError::Solver { kind, text } => {
                write!(f, "L-BFGS solver failed ({kind}): {text}")
            }

            // ---- Finite Diffs ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian is {}x{}, expected {expected}x{expected}",
                    found.0,
                    found.1
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Hessian entry ({row}, {col}) is {value}, must be finite")
            }

            // ---- Logit likelihood ----
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }
            OptError::NonFiniteUtility { row, value } => {
                write!(f, "Non-finite mean utility at row {row}: {value}")
            }
        }
    }
}

fn argmin_kind(err: &ArgminError) -> &'static str {
    match err {
        ArgminError::InvalidParameter { .. } => "invalid parameter",
        ArgminError::NotImplemented { .. } => "not implemented",
        ArgminError::NotInitialized { .. } => "not initialized",
        ArgminError::ConditionViolated { .. } => "condition violated",
        ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
        ArgminError::PotentialBug { .. } => "potential bug",
        ArgminError::ImpossibleError { .. } => "impossible error",
        _ => "unclassified",
    }
}

/// Errors raised by the likelihood inside the solver travel through argmin
/// boxed; unwrap them back to the original `OptError` when possible.
impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                OptError::Solver { kind: argmin_kind(&argmin_err), text: argmin_err.to_string() }
            }
            Err(other) => OptError::Solver { kind: "backend", text: other.to_string() },
        }
    }
}
