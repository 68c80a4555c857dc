//! estimation::iv_logit — plain logit by linear IV on mean utilities.
//!
//! Purpose
//! -------
//! Estimate `δ_j = x_j'β + ξ_j` with `δ_j = ln s_j − ln s_0`, instrumenting
//! `prices` with the BLP-style characteristic sums. This is the closed-form
//! plain-logit estimator: no nonlinear optimization is involved.
//!
//! Key behaviors
//! -------------
//! - Instruments are `Z = [X without prices, demand_instruments*]`. The
//!   first stage is the projection `X̂ = Z (ZᵀZ)⁺ ZᵀX`, so redundant
//!   instruments are dropped silently.
//! - `β = (X̂ᵀX̂)⁻¹ X̂ᵀδ`; a rank-deficient `X̂ᵀX̂` is a
//!   [`EstimationError::SingularDesign`].
//! - Standard errors are heteroskedasticity-robust (HC0) with structural
//!   residuals `u = δ − Xβ`:
//!   `V = A⁻¹ (Σ u_j² x̂_j x̂_jᵀ) A⁻¹`, `A = X̂ᵀX̂`.
//! - With no `prices` column or no instruments, `X̂ = X` and the fit is OLS
//!   on `δ` with the same robust errors.
//!
//! Caveats
//! -------
//! - This is one-step 2SLS. A two-step efficient GMM fit reweights by the
//!   inverse of the first-step moment covariance, so when instruments
//!   outnumber the endogenous `prices` column its estimates differ from
//!   these in finite samples. The two coincide for an exactly identified
//!   design.
use nalgebra::{DMatrix, DVector};

use crate::{
    estimation::{
        design::logit_design,
        errors::EstimationResult,
        estimator::{mean_utilities, DemandEstimator, Estimates, ParamEstimate},
        linalg::{inverse_gram, project},
        specification::Formulation,
    },
    inference::to_dmatrix,
    market::MarketTable,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IvLogit;

/// Instrument matrix: exogenous design columns followed by the excluded
/// instruments.
fn instrument_matrix(x: &DMatrix<f64>, price_col: usize, table: &MarketTable) -> DMatrix<f64> {
    let n = x.nrows();
    let exogenous: Vec<usize> = (0..x.ncols()).filter(|&j| j != price_col).collect();
    let l = exogenous.len() + table.n_instruments;
    DMatrix::from_fn(n, l, |i, j| {
        if j < exogenous.len() {
            x[(i, exogenous[j])]
        } else {
            table.rows[i].demand_instruments[j - exogenous.len()]
        }
    })
}

impl DemandEstimator for IvLogit {
    fn name(&self) -> &'static str {
        "iv_logit"
    }

    fn estimate(
        &self, formulation: &Formulation, table: &MarketTable,
    ) -> EstimationResult<Estimates> {
        let design = logit_design(formulation, table)?;
        let delta = DVector::from_vec(mean_utilities(table)?);
        let x = to_dmatrix(&design.matrix);

        let x_hat = match design.column_index("prices") {
            Some(p) if table.n_instruments > 0 => project(&instrument_matrix(&x, p, table), &x),
            _ => x.clone(),
        };

        let a_inv = inverse_gram(&x_hat, "IV logit")?;
        let beta = &a_inv * (x_hat.transpose() * &delta);
        let resid = &delta - &x * &beta;

        let weighted =
            DMatrix::from_fn(x_hat.nrows(), x_hat.ncols(), |i, j| x_hat[(i, j)] * resid[i]);
        let meat = weighted.transpose() * &weighted;
        let cov = &a_inv * meat * &a_inv;

        Ok(design
            .names
            .into_iter()
            .enumerate()
            .map(|(k, name)| ParamEstimate {
                name,
                value: beta[k],
                se: cov[(k, k)].max(0.0).sqrt(),
            })
            .collect())
    }
}
