//! Numerical stability utilities.
//!
//! Logit shares with an outside option are `σ_j = exp(u_j) / (1 + Σ_k exp(u_k))`.
//! Evaluated naïvely, a single large utility overflows `exp` and poisons the
//! whole market. The helpers here shift by the running maximum (including
//! the outside option's zero utility) so every exponent is `≤ 0`.
//!
//! # Provided items
//! - [`EIGEN_EPS`]: eigenvalues at or below this are treated as zero when
//!   forming pseudoinverses of information matrices.
//! - [`log_one_plus_sum_exp`]: stable `ln(1 + Σ exp(u_k))`.
//! - [`logit_shares`]: inside shares and the outside share for one market.

/// Eigenvalue floor for pseudoinverse construction.
pub const EIGEN_EPS: f64 = 1e-12;

/// Numerically stable `ln(1 + Σ_k exp(u_k))`.
///
/// The outside option contributes `exp(0)`, so the shift is
/// `m = max(0, max_k u_k)` and the result is
/// `m + ln(exp(-m) + Σ_k exp(u_k - m))`.
///
/// # Parameters
/// - `utilities`: mean utilities of the inside products in one market.
///
/// # Returns
/// - The log of the logit denominator. Returns `0.0` for an empty market.
pub fn log_one_plus_sum_exp(utilities: &[f64]) -> f64 {
    let m = utilities.iter().copied().fold(0.0_f64, f64::max);
    let tail: f64 = utilities.iter().map(|&u| (u - m).exp()).sum();
    m + ((-m).exp() + tail).ln()
}

/// Logit shares for one market with an outside option of zero utility.
///
/// # Returns
/// - `(inside, outside)` where `inside[j] = exp(u_j - lse)` and
///   `outside = exp(-lse)` with `lse = ln(1 + Σ exp(u_k))`. The shares sum
///   to one up to rounding.
pub fn logit_shares(utilities: &[f64]) -> (Vec<f64>, f64) {
    let lse = log_one_plus_sum_exp(utilities);
    let inside = utilities.iter().map(|&u| (u - lse).exp()).collect();
    (inside, (-lse).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // On moderate utilities the guarded log-sum-exp must agree with the
    // direct formula.
    //
    // Given
    // -----
    // - Utilities [-1.0, 0.5, 2.0].
    //
    // Expect
    // ------
    // - Agreement with `ln(1 + Σ exp(u))` to 1e-12.
    fn log_one_plus_sum_exp_matches_naive_formula_on_safe_inputs() {
        // Arrange
        let u = [-1.0, 0.5, 2.0];
        let naive = (1.0 + u.iter().map(|x: &f64| x.exp()).sum::<f64>()).ln();

        // Act
        let guarded = log_one_plus_sum_exp(&u);

        // Assert
        assert!((guarded - naive).abs() < 1e-12);
    }

    #[test]
    fn log_one_plus_sum_exp_is_finite_for_huge_utilities() {
        let lse = log_one_plus_sum_exp(&[800.0, 799.0]);
        assert!(lse.is_finite());
        assert!((lse - (800.0 + (1.0 + (-1.0_f64).exp()).ln())).abs() < 1e-9);
    }

    #[test]
    fn empty_market_has_outside_share_one() {
        let (inside, outside) = logit_shares(&[]);
        assert!(inside.is_empty());
        assert!((outside - 1.0).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Shares produced by `logit_shares` must form a probability vector
    // together with the outside share.
    fn logit_shares_sum_to_one() {
        // Arrange
        let u = [0.3, -2.0, 1.1, 0.0];

        // Act
        let (inside, outside) = logit_shares(&u);

        // Assert
        let total: f64 = inside.iter().sum::<f64>() + outside;
        assert!((total - 1.0).abs() < 1e-12);
        assert!(inside.iter().all(|&s| s > 0.0 && s < 1.0));
    }
}
