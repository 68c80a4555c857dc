//! Bridge from a [`LogLikelihood`] to argmin's minimization traits.
//!
//! argmin minimizes, so the adapter reports the cost `c(θ) = -ℓ(θ)` and the
//! gradient `-∇ℓ(θ)`. Models without an analytic gradient are differenced on
//! the cost closure directly, which already carries the sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// argmin problem wrapping a model and a borrowed view of its data.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Central-difference gradient of the cost, retried with forward
    /// differences when an evaluation fails or the result is not finite.
    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            match self.cost(theta) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let central = theta.central_diff(&cost_func);
        let failed = closure_err.borrow().is_some();
        if !failed && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let loglik = self.f.value(theta, self.data)?;
        if !loglik.is_finite() {
            return Err(OptError::NonFiniteCost { value: loglik }.into());
        }
        Ok(-loglik)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// `-∇ℓ(θ)` from the model, or a finite-difference gradient of the cost
    /// when the model returns [`OptError::GradientNotImplemented`]. Any other
    /// model error is propagated.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}
