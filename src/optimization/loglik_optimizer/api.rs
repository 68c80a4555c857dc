//! Entry point for maximizing a [`LogLikelihood`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
        OptimOutcome,
        Theta,
    },
};

/// Maximize `ℓ(θ)` with L-BFGS starting from `theta0`.
///
/// The model's `check` runs once on `theta0` before any solver is built.
/// The line search is chosen by `opts.line_searcher`; tolerances and the
/// iteration cap come from `opts.tols`.
///
/// # Errors
/// - Anything `f.check` rejects.
/// - Solver construction or runtime failures, mapped into
///   [`OptError`](crate::optimization::errors::OptError).
///
/// # Returns
/// An [`OptimOutcome`] whose `value` is the best log-likelihood found.
/// Reaching `max_iter` is *not* an error here; callers inspect
/// `OptimOutcome::hit_max_iter`.
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::{Grad, Tolerances},
    };
    use ndarray::array;

    // Concave quadratic ℓ(θ) = -Σ w_k (θ_k - c_k)² with optimum at c.
    struct WeightedQuadratic {
        weights: Theta,
    }

    impl LogLikelihood for WeightedQuadratic {
        type Data = Theta;

        fn value(&self, theta: &Theta, center: &Theta) -> OptResult<f64> {
            let d = theta - center;
            Ok(-(&d * &d * &self.weights).sum())
        }

        fn check(&self, theta: &Theta, center: &Theta) -> OptResult<()> {
            if theta.len() != center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: center.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, center: &Theta) -> OptResult<Grad> {
            Ok((center - theta) * &self.weights * 2.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // `maximize` must recover the known optimum of a concave quadratic with
    // both line searches.
    //
    // Given
    // -----
    // - ℓ(θ) = -Σ w_k (θ_k - c_k)², w = (1, 4, 0.5), c = (0.3, -1.2, 2.0).
    // - θ₀ = 0, tol_grad = 1e-10, max_iter = 200.
    //
    // Expect
    // ------
    // - θ̂ ≈ c within 1e-6, ℓ(θ̂) ≈ 0, and the run converged.
    fn maximize_recovers_quadratic_optimum() {
        // Arrange
        let model = WeightedQuadratic { weights: array![1.0, 4.0, 0.5] };
        let center = array![0.3, -1.2, 2.0];
        let tols = Tolerances::new(Some(1e-10), None, Some(200)).expect("valid tolerances");

        for searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts = MLEOptions::new(tols, searcher, None).expect("valid options");

            // Act
            let out = maximize(&model, array![0.0, 0.0, 0.0], &center, &opts)
                .expect("quadratic should optimize");

            // Assert
            for (got, want) in out.theta_hat.iter().zip(center.iter()) {
                assert!((got - want).abs() < 1e-6, "{searcher:?}: {got} vs {want}");
            }
            assert!(out.value.abs() < 1e-10);
            assert!(out.converged);
        }
    }

    #[test]
    fn maximize_runs_check_before_solving() {
        let model = WeightedQuadratic { weights: array![1.0, 1.0] };
        let center = array![0.0, 0.0];

        let err = maximize(&model, array![1.0], &center, &MLEOptions::default())
            .expect_err("length mismatch must be rejected");

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 2, actual: 1 });
    }
}
