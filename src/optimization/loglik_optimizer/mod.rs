//! loglik_optimizer — argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Provide the optimization layer used by the grouped-logit MLE backend.
//! Callers implement [`LogLikelihood`] for a model and invoke [`maximize`]
//! to run L-BFGS with a configurable line search, tolerances, and
//! finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Convert user log-likelihoods `ℓ(θ)` into Argmin cost functions
//!   `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`].
//! - Expose a single entrypoint [`maximize`] that validates the initial
//!   guess, selects an L-BFGS solver via [`builders`], executes it via
//!   [`run::run_lbfgs`], and normalizes results into an [`OptimOutcome`].
//! - Provide finite-difference helpers in [`finite_diff`] for gradients and
//!   Hessians when analytic derivatives are missing.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** `ℓ(θ)`; user code implements `ℓ(θ)`
//!   and `∇ℓ(θ)`, never the cost directly.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid
//!   inputs as [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - Configuration types ([`Tolerances`], [`MLEOptions`]) are validated on
//!   construction.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions in [`adapter`], solver
//!   construction in [`builders`], finite differences in [`finite_diff`],
//!   and configuration invariants in [`traits`].
//! - [`api`] tests run [`maximize`] on a concave quadratic with a known
//!   optimum; the logit backend tests exercise it on real shares.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, FnEvalMap, Grad, Theta, DEFAULT_LBFGS_MEM};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
