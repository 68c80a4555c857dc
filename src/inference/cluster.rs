//! inference::cluster — market-clustered covariance of the average score.
//!
//! Purpose
//! -------
//! Build the "meat" `S` of a sandwich estimator when observations are
//! grouped into markets. With market weights `N_m`, total weight
//! `N = Σ_m N_m`, and per-market average scores `g_m`, the average score is
//! `ḡ = (1/N) Σ_m N_m g_m` and its clustered covariance is
//!
//! ```text
//! S = G/(G-1) · (1/N²) Σ_m (N_m g_m - c)(N_m g_m - c)ᵀ,   c = (1/G) Σ_m N_m g_m
//! ```
//!
//! where `G` is the number of markets. At an interior optimum `c ≈ 0`, so
//! centering only matters away from the maximum.
//!
//! Invariants & assumptions
//! ------------------------
//! - `scores` is `G × p`, one row per market, on the same coefficient scale
//!   as the information matrix it will be combined with.
//! - `G ≥ 2`; a single market has no between-market dispersion.
use crate::inference::errors::{InferenceError, InferenceResult};
use ndarray::{Array1, Array2, Axis};

/// Clustered covariance of the weighted average score.
///
/// # Errors
/// - [`InferenceError::ClusterLengthMismatch`] when `weights.len()` differs
///   from the number of score rows.
/// - [`InferenceError::ScoreDimMismatch`] when the score width is not `dim`.
/// - [`InferenceError::TooFewClusters`] for fewer than two markets.
/// - [`InferenceError::NonFiniteScore`] for NaN/∞ scores or weights.
pub fn cluster_score_covariance(
    scores: &Array2<f64>, weights: &[f64], dim: usize,
) -> InferenceResult<Array2<f64>> {
    let (g, p) = scores.dim();
    if weights.len() != g {
        return Err(InferenceError::ClusterLengthMismatch { scores: g, weights: weights.len() });
    }
    if p != dim {
        return Err(InferenceError::ScoreDimMismatch { expected: dim, found: p });
    }
    if g < 2 {
        return Err(InferenceError::TooFewClusters { clusters: g });
    }
    if let Some(((row, col), &value)) = scores.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(InferenceError::NonFiniteScore { row, col, value });
    }
    if let Some((row, &value)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
        return Err(InferenceError::NonFiniteScore { row, col: p, value });
    }

    let total: f64 = weights.iter().sum();
    let mut weighted = scores.clone();
    for (mut row, &w) in weighted.axis_iter_mut(Axis(0)).zip(weights) {
        row *= w;
    }
    let center: Array1<f64> = weighted.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
    weighted -= &center;

    let correction = g as f64 / (g as f64 - 1.0);
    Ok(weighted.t().dot(&weighted) * (correction / (total * total)))
}
