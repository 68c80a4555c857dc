//! estimation — nested-specification demand fits on prepared tables.
//!
//! Purpose
//! -------
//! Compare logit demand estimates across data sources and a sequence of
//! cumulative covariate specifications. Each (specification, source) cell
//! gets a discrete-choice fit and a linear share regression.
//!
//! Key behaviors
//! -------------
//! - [`specification`]: master covariate list, default indices, and the
//!   [`Formulation`] (covariates + fixed-effect block) for each index.
//! - [`design`]: formula-coded and dummy-coded design matrices.
//! - [`DemandEstimator`]: the seam for discrete-choice backends, with
//!   [`IvLogit`] (closed-form IV on mean utilities, the default) and
//!   [`MleLogit`] (grouped-logit maximum likelihood through the
//!   `optimization` layer).
//! - [`ols`]: linear regression of shares with classical errors.
//! - [`run_specifications`]: drives the grid and emits long-format
//!   [`ComparisonRecord`]s.
//!
//! Conventions
//! -----------
//! - Estimates are reported in design-column order with the design's
//!   column names.
//! - Errors are returned, never logged here; the orchestrator decides
//!   whether a failure is fatal.

pub mod design;
pub mod errors;
pub mod estimator;
pub mod iv_logit;
pub mod linalg;
pub mod mle_logit;
pub mod ols;
pub mod runner;
pub mod specification;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::errors::{EstimationError, EstimationResult};
pub use self::estimator::{DemandEstimator, Estimates, EstimatorKind, ParamEstimate};
pub use self::iv_logit::IvLogit;
pub use self::mle_logit::{CovarianceKind, MleLogit};
pub use self::runner::{run_specifications, ComparisonRecord, ComparisonTables, DataSource};
pub use self::specification::{
    Formulation, Specification, DEFAULT_SPECIFICATIONS, MASTER_COVARIATES,
};

pub mod prelude {
    pub use super::errors::{EstimationError, EstimationResult};
    pub use super::estimator::{DemandEstimator, Estimates, ParamEstimate};
    pub use super::runner::{run_specifications, ComparisonTables};
    pub use super::specification::{Formulation, Specification};
}
