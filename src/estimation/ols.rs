//! Ordinary least squares with classical standard errors.
use nalgebra::DVector;
use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::{
    estimation::{
        design::Design,
        errors::{EstimationError, EstimationResult},
        linalg::inverse_gram,
    },
    inference::to_dmatrix,
};

/// Fitted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub names: Vec<String>,
    pub coefficients: Array1<f64>,
    pub standard_errors: Array1<f64>,
    /// `RSS / (n − k)`.
    pub residual_variance: f64,
    pub dof: usize,
}

impl LinearFit {
    /// Two-sided p-values from Student's t with `dof` degrees of freedom.
    /// `NaN` where a standard error is zero.
    pub fn p_values(&self) -> Array1<f64> {
        let Ok(t) = StudentsT::new(0.0, 1.0, self.dof as f64) else {
            return Array1::from_elem(self.coefficients.len(), f64::NAN);
        };
        self.coefficients
            .iter()
            .zip(self.standard_errors.iter())
            .map(|(&b, &se)| {
                if se > 0.0 { 2.0 * (1.0 - t.cdf((b / se).abs())) } else { f64::NAN }
            })
            .collect()
    }
}

/// Regress `y` on the design.
///
/// # Errors
/// - [`EstimationError::InsufficientObservations`] when `n ≤ k`.
/// - [`EstimationError::SingularDesign`] when `XᵀX` is rank deficient.
pub fn ols(design: &Design, y: &[f64]) -> EstimationResult<LinearFit> {
    let (n, k) = design.matrix.dim();
    if n <= k {
        return Err(EstimationError::InsufficientObservations { observations: n, columns: k });
    }
    let x = to_dmatrix(&design.matrix);
    let y = DVector::from_column_slice(y);
    let xtx_inv = inverse_gram(&x, "OLS")?;
    let beta = &xtx_inv * (x.transpose() * &y);
    let resid = &y - &x * &beta;
    let dof = n - k;
    let sigma2 = resid.norm_squared() / dof as f64;
    let se = Array1::from_iter((0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).max(0.0).sqrt()));

    Ok(LinearFit {
        names: design.names.clone(),
        coefficients: Array1::from_iter(beta.iter().copied()),
        standard_errors: se,
        residual_variance: sigma2,
        dof,
    })
}
