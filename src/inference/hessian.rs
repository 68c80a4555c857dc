//! inference::hessian — standard errors from observed information.
//!
//! Purpose
//! -------
//! Turn a score map at the fitted coefficients into classical or sandwich
//! standard errors. The observed information `J(θ̂)` is the
//! finite-difference Jacobian of the score map; its inverse is taken through
//! a truncated symmetric eigendecomposition so that weakly identified
//! directions (for example an unused fixed-effect level) do not blow up
//! the other coefficients.
//!
//! Invariants & assumptions
//! ------------------------
//! - The score map is the gradient of the **negative average**
//!   log-likelihood, so `J(θ̂)` is positive semi-definite at a maximum.
//!   Eigenvalues at or below the truncation threshold are dropped.
//! - When provided, `scores` is the `n×n` covariance of the *average* score
//!   (see [`cluster_score_covariance`](super::cluster::cluster_score_covariance)).
//!
//! Conventions
//! -----------
//! - Classical SEs are `sqrt(diag(J⁺))`, i.e. on the average-likelihood
//!   scale. Callers divide by `sqrt(N)` for a sample of total weight `N`.
//! - Sandwich SEs are `sqrt(diag(J⁺ S J⁺))` and need no further scaling.
//! - No explicit inverse is ever formed; [`pseudo_inverse`] is the only
//!   route from `J` to a covariance.
use crate::optimization::{
    errors::OptResult, loglik_optimizer::finite_diff::compute_hessian,
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Standard errors at `theta_hat` from the score map `f`.
///
/// # Parameters
/// - `f`: gradient of the negative average log-likelihood.
/// - `theta_hat`: fitted coefficients.
/// - `scores`: optional average-score covariance `S`; `None` gives
///   classical SEs.
///
/// # Errors
/// Propagates [`compute_hessian`] failures (non-finite or misshapen
/// information matrices).
pub fn calc_standard_errors<F: Fn(&Array1<f64>) -> Array1<f64>>(
    f: &F, theta_hat: &Array1<f64>, scores: Option<&Array2<f64>>,
) -> OptResult<Array1<f64>> {
    let obs_info = compute_hessian(f, theta_hat)?;
    let j_pinv = pseudo_inverse(&to_dmatrix(&obs_info));
    let cov = match scores {
        Some(s) => {
            let s = to_dmatrix(s);
            &j_pinv * s * &j_pinv
        }
        None => j_pinv,
    };
    Ok(Array1::from_iter((0..cov.nrows()).map(|i| cov[(i, i)].max(0.0).sqrt())))
}

/// Moore–Penrose pseudoinverse of a symmetric matrix.
///
/// Eigenvalues `λ ≤ EIGEN_EPS · max(1, λ_max)` are treated as zero.
pub fn pseudo_inverse(m: &DMatrix<f64>) -> DMatrix<f64> {
    let n = m.nrows();
    let eigen = m.clone().symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    let threshold = EIGEN_EPS * lambda_max.max(1.0);
    let q = &eigen.eigenvectors;
    let mut out = DMatrix::<f64>::zeros(n, n);
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda > threshold {
            let col = q.column(k);
            out += (col * col.transpose()) / lambda;
        }
    }
    out
}

/// Number of eigenvalues above the pseudoinverse threshold.
pub fn numerical_rank(m: &DMatrix<f64>) -> usize {
    let eigen = m.clone().symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    let threshold = EIGEN_EPS * lambda_max.max(1.0);
    eigen.eigenvalues.iter().filter(|&&l| l > threshold).count()
}

pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}
