//! numerical_stability — overflow-safe helpers for logit shares.
//!
//! Purpose
//! -------
//! Collect the small numeric primitives shared by the logit likelihood and
//! the standard-error code: a guarded log-sum-exp with an implicit outside
//! option, the share map it induces, and the eigenvalue floor used when
//! forming pseudoinverses.
//!
//! Testing notes
//! -------------
//! - Unit tests compare the guarded forms against naïve formulas on safe
//!   inputs and check that extreme utilities stay finite.

pub mod transformations;

pub use self::transformations::{log_one_plus_sum_exp, logit_shares, EIGEN_EPS};

pub mod prelude {
    pub use super::transformations::{log_one_plus_sum_exp, logit_shares, EIGEN_EPS};
}
