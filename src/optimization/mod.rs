//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the maximum-likelihood layer used by likelihood-based demand
//! backends. Callers implement a log-likelihood over a coefficient vector,
//! choose tolerances, and obtain fitted coefficients and diagnostics without
//! touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`), including configuration of the L-BFGS solver and
//!   stopping criteria.
//! - Supply shared numerical primitives (`numerical_stability`) for
//!   overflow-safe logit shares and eigenvalue truncation.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Conventions
//! -----------
//! - All solvers conceptually maximize `ℓ(θ)` by minimizing an internal cost
//!   `c(θ) = -ℓ(θ)`; user-facing APIs and outcomes are expressed in terms of
//!   `ℓ`.
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw Argmin errors.
//! - This module avoids I/O and logging; the estimation layer reports
//!   progress.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
