//! loglik_optimizer::finite_diff — numerical derivatives with validation.
//!
//! Purpose
//! -------
//! Supply the finite-difference gradient used when a likelihood has no
//! analytic gradient, and the finite-difference Hessian used by the
//! standard-error code to differentiate an analytic score.
//!
//! Invariants & assumptions
//! ------------------------
//! - Closures that cannot return `Result` record their first failure in a
//!   shared `RefCell<Option<Error>>` and yield `NaN`; [`run_fd_diff`]
//!   surfaces that error instead of a garbage gradient.
//! - Every matrix returned by [`compute_hessian`] is square, finite, and
//!   symmetric.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        types::Hessian,
        validation::{validate_grad, validate_hessian},
        Grad,
        Theta,
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// `closure_err` is cleared on entry; if `func` records an error during the
/// sweep, that error is returned.
///
/// # Errors
/// - The captured closure error, converted into an `OptError`.
/// - `GradientDimMismatch` / `InvalidGradient` from [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Jacobian of a gradient map `f` at `theta`, i.e. a Hessian.
///
/// Central differences are tried first; if that matrix fails validation the
/// forward-difference matrix is used instead. The result is symmetrized.
///
/// # Errors
/// - `HessianDimMismatch` / `InvalidHessian` when the forward fallback also
///   fails validation.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// Average each off-diagonal pair in place.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
