//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Centralizes the parameter, gradient, Hessian, and cost aliases plus the
//! pre-wired L-BFGS solver types, so the rest of the optimizer stays
//! agnostic to `ndarray` and Argmin generics.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Coefficient vector `θ`; one entry per design column.
pub type Theta = Array1<f64>;

/// Gradient vector `∇ℓ(θ)` or `∇c(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Dense `n × n` Hessian for `n = Theta.len()`.
pub type Hessian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver
/// (e.g. `"cost_count"`, `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
