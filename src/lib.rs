//! demand_compare — logit demand comparison across vehicle data sources.
//!
//! Purpose
//! -------
//! Estimate discrete-choice demand for new vehicles on two panels (a
//! survey-derived reference panel and a county-level registration panel)
//! under a sequence of nested specifications, and write the coefficients
//! side by side so the data sources can be compared.
//!
//! Key behaviors
//! -------------
//! - [`market`]: raw row types, the prepared [`market::MarketTable`], and
//!   CSV I/O.
//! - [`prepare`]: turns each raw panel into a market table (energy prices,
//!   zero-share replacement, product grouping, market sizes, firms, shares,
//!   and differentiation instruments).
//! - [`estimation`]: formulations, design matrices, the
//!   [`estimation::DemandEstimator`] backends, OLS, and the comparison grid.
//! - [`orchestrator`]: configuration, run directories, the per-run log, and
//!   the all-years / per-year driver.
//! - [`optimization`] and [`inference`]: L-BFGS maximum likelihood and
//!   standard errors, used by the MLE logit backend.
//!
//! Invariants & assumptions
//! ------------------------
//! - Prepared tables satisfy `0 ≤ share ≤ 1` and
//!   `outside_share = 1 − Σ shares ∈ (0, 1)` in every market.
//! - Every data-integrity problem is a typed, fatal error; nothing is
//!   silently dropped except rows with unknown fuels or missing
//!   characteristics, which are counted in the log.
//!
//! Conventions
//! -----------
//! - Errors are per-layer enums (`DataError`, `PrepareError`,
//!   `EstimationError`, `RunError`, plus `OptError` / `InferenceError`) with
//!   explicit `From` conversions up the stack.
//! - Logging goes through `tracing`; only the binary installs a global
//!   subscriber, runs install their own scoped one.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each module; end-to-end runs on small CSV
//!   fixtures are in `tests/`.

pub mod estimation;
pub mod inference;
pub mod market;
pub mod optimization;
pub mod orchestrator;
pub mod prepare;

pub mod prelude {
    pub use crate::estimation::prelude::*;
    pub use crate::market::{MarketDefinition, MarketTable};
    pub use crate::orchestrator::{run, RunConfig, RunError, RunOutcome, RunStamp};
    pub use crate::prepare::{prepare_reference, prepare_registration, MakeRemoval, PrepareOptions};
}
