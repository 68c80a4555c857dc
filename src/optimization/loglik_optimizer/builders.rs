//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Turn an [`MLEOptions`] into a ready-to-run L-BFGS solver without leaking
//! argmin generics into the estimation layer.
//!
//! Conventions
//! -----------
//! - History size comes from `opts.lbfgs_mem`, else [`DEFAULT_LBFGS_MEM`].
//! - Only tolerances are applied here; the starting point and iteration cap
//!   belong to the runner.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, Theta,
            DEFAULT_LBFGS_MEM,
        },
    },
};

/// L-BFGS with a Hager–Zhang line search.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with a More–Thuente line search.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the gradient-norm and cost-change tolerances that are present.
///
/// # Errors
/// argmin rejects negative tolerances; that rejection surfaces as an
/// [`OptError`](crate::optimization::errors::OptError).
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    #[test]
    // Purpose
    // -------
    // Both builders must accept the default logit options and an explicit
    // history size.
    fn builders_accept_default_and_explicit_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-8), Some(1e-12), Some(500)).expect("valid tolerances");
        let with_mem =
            MLEOptions::new(tols, LineSearcher::HagerZhang, Some(11)).expect("valid options");

        // Act / Assert
        assert!(build_optimizer_hager_zhang(&MLEOptions::default()).is_ok());
        assert!(build_optimizer_more_thuente(&MLEOptions::default()).is_ok());
        assert!(build_optimizer_hager_zhang(&with_mem).is_ok());
        assert!(build_optimizer_more_thuente(&with_mem).is_ok());
    }

    #[test]
    fn configure_lbfgs_skips_absent_tolerances() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid options");

        assert!(configure_lbfgs(raw, &opts).is_ok());
    }
}
