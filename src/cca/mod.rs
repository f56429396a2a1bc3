//! Canonical correlation analysis (CCA)
//!
//! The squared canonical correlations between X and Y are the squared singular
//! values of `Qxᵀ Qy`, where `Qx`, `Qy` are orthonormal bases of the column
//! spaces. Their mean is `‖Qxᵀ Qy‖_F² / min(dx, dy)`.
//!
//! Features are used as given (not mean-centered). The score is invariant to
//! any invertible linear map applied to either representation.
//!
//! Rank-deficient inputs are not detected: the QR factorization still returns
//! a basis, but its extra columns are dominated by rounding noise and the
//! score loses precision.

use crate::core::Result;
use crate::utils::{stats, validation};
use log::debug;
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayBase, ArrayView2, Data, Ix2};

/// Mean squared canonical correlation between two feature matrices
///
/// # Errors
/// - [`SimilarityError::EmptyInput`](crate::core::SimilarityError::EmptyInput) for empty matrices
/// - [`SimilarityError::DimensionMismatch`](crate::core::SimilarityError::DimensionMismatch)
///   if the row counts differ
pub fn cca<S1, S2>(features_x: &ArrayBase<S1, Ix2>, features_y: &ArrayBase<S2, Ix2>) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let (x, y) = (features_x.view(), features_y.view());
    validation::ensure_same_examples(&x, &y)?;
    debug!("CCA: n={}, dx={}, dy={}", x.nrows(), x.ncols(), y.ncols());

    let qx = orthonormal_basis(&x);
    let qy = orthonormal_basis(&y);
    let correlations = qx.t().dot(&qy);

    let min_features = x.ncols().min(y.ncols()) as f64;
    Ok(stats::frobenius_norm_squared(&correlations.view()) / min_features)
}

/// Thin Q factor of a Householder QR factorization of `x`
///
/// Returns an `n x min(n, d)` matrix with orthonormal columns spanning the
/// column space of `x` (when `x` has full column rank).
pub fn orthonormal_basis(x: &ArrayView2<f64>) -> Array2<f64> {
    let (n, d) = x.dim();
    let matrix = DMatrix::from_fn(n, d, |i, j| x[[i, j]]);
    let q = matrix.qr().q();
    Array2::from_shape_fn((q.nrows(), q.ncols()), |(i, j)| q[(i, j)])
}
