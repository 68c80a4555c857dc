//! Executor wiring shared by both L-BFGS line-search variants.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        adapter::ArgMinAdapter, Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta,
    },
};
use argmin::core::{Executor, IterState, Solver, State};

/// Run `solver` on `problem` from `theta0` and normalize the final state.
///
/// - `theta0` is moved into the executor state.
/// - `opts.tols.max_iter`, when set, caps the iteration count.
/// - The outcome reports `ℓ(θ̂) = -best_cost`.
///
/// # Errors
/// - argmin runtime failures (line search breakdowns, model errors raised
///   inside cost or gradient evaluations), converted via
///   `From<argmin::core::Error>`.
/// - Validation failures on the best parameter or value.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    let max_iter = opts.tols.max_iter;
    let optimizer = Executor::new(problem, solver).configure(|state| {
        let state = state.param(theta0);
        match max_iter {
            Some(n) => state.max_iters(n as u64),
            None => state,
        }
    });

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
