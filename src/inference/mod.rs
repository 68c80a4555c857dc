//! inference — standard errors for fitted demand coefficients.
//!
//! Purpose
//! -------
//! Provide post-estimation uncertainty for likelihood-based and linear
//! demand backends: observed-information standard errors, a
//! market-clustered sandwich variant, and the symmetric pseudoinverse that
//! every covariance in the crate goes through.
//!
//! Key behaviors
//! -------------
//! - [`calc_standard_errors`]: classical or sandwich SEs from a score map.
//! - [`cluster_score_covariance`]: covariance of the weighted average score
//!   with markets as clusters.
//! - [`pseudo_inverse`] / [`numerical_rank`]: eigen-truncated inverse and
//!   rank of a symmetric matrix, shared with the linear estimators.
//!
//! Conventions
//! -----------
//! - Coefficients live on whatever scale the caller optimized on; mapping
//!   back to raw units is the caller's job.
//! - Functions are pure: no logging and no global state.

pub mod cluster;
pub mod errors;
pub mod hessian;

pub use self::cluster::cluster_score_covariance;
pub use self::errors::{InferenceError, InferenceResult};
pub use self::hessian::{calc_standard_errors, numerical_rank, pseudo_inverse, to_dmatrix};

pub mod prelude {
    pub use super::cluster::cluster_score_covariance;
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hessian::{calc_standard_errors, pseudo_inverse};
}
