//! Dense least-squares helpers shared by the linear estimators.
//!
//! Gram matrices are formed on RMS-scaled columns before any rank check or
//! inversion, so prices in dollars and 0/1 dummies are judged on the same
//! footing by the eigenvalue threshold.
use nalgebra::{DMatrix, DVector};

use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    inference::{numerical_rank, pseudo_inverse},
};

/// Root-mean-square of each column; `1.0` for an all-zero column.
pub fn column_scales(x: &DMatrix<f64>) -> DVector<f64> {
    let n = x.nrows().max(1) as f64;
    DVector::from_iterator(
        x.ncols(),
        x.column_iter().map(|c| {
            let rms = (c.norm_squared() / n).sqrt();
            if rms > 0.0 { rms } else { 1.0 }
        }),
    )
}

/// Scaled Gram matrix `D⁻¹XᵀXD⁻¹` and `D⁻¹`, checked for full column rank.
fn full_rank_gram(
    x: &DMatrix<f64>, model: &'static str,
) -> EstimationResult<(DMatrix<f64>, DMatrix<f64>)> {
    let inv_scale = DMatrix::from_diagonal(&column_scales(x).map(|s| 1.0 / s));
    let xs = x * &inv_scale;
    let gram = xs.transpose() * &xs;
    let rank = numerical_rank(&gram);
    if rank < x.ncols() {
        return Err(EstimationError::SingularDesign { model, rank, columns: x.ncols() });
    }
    Ok((gram, inv_scale))
}

/// Reject a design whose columns are not linearly independent.
///
/// # Errors
/// [`EstimationError::SingularDesign`] if the scaled Gram matrix has
/// numerical rank below the column count.
pub fn ensure_full_rank(x: &DMatrix<f64>, model: &'static str) -> EstimationResult<()> {
    full_rank_gram(x, model).map(|_| ())
}

/// `(XᵀX)⁻¹` for a full-column-rank `X`.
///
/// # Errors
/// [`EstimationError::SingularDesign`] as for [`ensure_full_rank`].
pub fn inverse_gram(x: &DMatrix<f64>, model: &'static str) -> EstimationResult<DMatrix<f64>> {
    let (gram, inv_scale) = full_rank_gram(x, model)?;
    Ok(&inv_scale * pseudo_inverse(&gram) * &inv_scale)
}

/// Projection of `X` onto the column space of `Z`: `Z (ZᵀZ)⁺ ZᵀX`.
/// Redundant instruments are dropped by the pseudoinverse rather than
/// rejected.
pub fn project(z: &DMatrix<f64>, x: &DMatrix<f64>) -> DMatrix<f64> {
    let inv_scale = DMatrix::from_diagonal(&column_scales(z).map(|s| 1.0 / s));
    let zs = z * inv_scale;
    let ztz_pinv = pseudo_inverse(&(zs.transpose() * &zs));
    &zs * (ztz_pinv * (zs.transpose() * x))
}
