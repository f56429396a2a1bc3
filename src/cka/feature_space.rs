//! Linear CKA computed directly from feature matrices
//!
//! For the linear kernel, `⟨H X Xᵀ H, H Y Yᵀ H⟩_F = ‖Xcᵀ Yc‖_F²` where `Xc`,
//! `Yc` are the column-centered features. Working with the `dx x dy`
//! cross-covariance instead of the `n x n` Gram matrices costs O(n·d²) time
//! and O(d²) memory, which is much cheaper when d ≪ n.
//!
//! The unbiased estimator is recovered with a closed-form correction that only
//! needs the diagonal of each linear Gram matrix (per-example squared norms).

use crate::core::{Estimator, Result, SimilarityError};
use crate::utils::{stats, validation};
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2};

/// Linear CKA from feature matrices
///
/// Equal, up to rounding, to
/// `cka(&linear_kernel(x)?, &linear_kernel(y)?, debiased)`.
///
/// # Errors
/// - [`SimilarityError::DimensionMismatch`] if the row counts differ
/// - [`SimilarityError::InsufficientExamples`] for the debiased path with n < 3
/// - [`SimilarityError::NegativeSelfSimilarity`] when a debiased self term
///   comes out negative. This only happens through rounding on tiny or
///   degenerate samples and is a limitation of the unbiased estimator.
/// - [`SimilarityError::ZeroNormalization`] if either representation is constant
pub fn feature_space_linear_cka<S1, S2>(
    features_x: &ArrayBase<S1, Ix2>,
    features_y: &ArrayBase<S2, Ix2>,
    debiased: bool,
) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let (x, y) = (features_x.view(), features_y.view());
    validation::ensure_same_examples(&x, &y)?;
    let n = x.nrows();
    validation::ensure_min_examples(n, Estimator::from_debiased(debiased))?;
    debug!(
        "Feature-space linear CKA: n={n}, dx={}, dy={}, debiased={debiased}",
        x.ncols(),
        y.ncols()
    );

    let x = center_columns(&x);
    let y = center_columns(&y);

    let mut dot_product_similarity = stats::frobenius_norm_squared(&x.t().dot(&y).view());
    let self_x = stats::frobenius_norm_squared(&x.t().dot(&x).view());
    let self_y = stats::frobenius_norm_squared(&y.t().dot(&y).view());

    let (normalization_x, normalization_y) = if debiased {
        let sum_squared_rows_x = sum_squared_rows(&x.view());
        let sum_squared_rows_y = sum_squared_rows(&y.view());
        let squared_norm_x = sum_squared_rows_x.sum();
        let squared_norm_y = sum_squared_rows_y.sum();

        dot_product_similarity = debiased_dot_product_similarity(
            dot_product_similarity,
            &sum_squared_rows_x.view(),
            &sum_squared_rows_y.view(),
            squared_norm_x,
            squared_norm_y,
            n,
        );
        (
            debiased_self_norm(self_x, &sum_squared_rows_x.view(), squared_norm_x, n)?,
            debiased_self_norm(self_y, &sum_squared_rows_y.view(), squared_norm_y, n)?,
        )
    } else {
        (self_x.sqrt(), self_y.sqrt())
    };

    let normalization = normalization_x * normalization_y;
    if normalization == 0.0 {
        return Err(SimilarityError::ZeroNormalization);
    }
    Ok(dot_product_similarity / normalization)
}

/// Unbiased correction of a linear dot-product similarity
///
/// Turns `‖Xᵀ Y‖_F²` (column-centered features) into the U-centered
/// inner product of the two linear Gram matrices:
///
/// `xty - n/(n-2) · ⟨ssr_x, ssr_y⟩ + sq_norm_x · sq_norm_y / ((n-1)(n-2))`
///
/// where `ssr_x[i] = Σⱼ X[i,j]²` and `sq_norm_x = Σᵢ ssr_x[i]`. The same
/// function corrects the cross term and, with both sides set to the same
/// matrix, each self term.
pub fn debiased_dot_product_similarity(
    xty: f64,
    sum_squared_rows_x: &ArrayView1<f64>,
    sum_squared_rows_y: &ArrayView1<f64>,
    squared_norm_x: f64,
    squared_norm_y: f64,
    n: usize,
) -> f64 {
    let n = n as f64;
    xty - n / (n - 2.0) * sum_squared_rows_x.dot(sum_squared_rows_y)
        + squared_norm_x * squared_norm_y / ((n - 1.0) * (n - 2.0))
}

fn debiased_self_norm(
    self_similarity: f64,
    sum_squared_rows: &ArrayView1<f64>,
    squared_norm: f64,
    n: usize,
) -> Result<f64> {
    let corrected = debiased_dot_product_similarity(
        self_similarity,
        sum_squared_rows,
        sum_squared_rows,
        squared_norm,
        squared_norm,
        n,
    );
    if !(corrected >= 0.0) {
        return Err(SimilarityError::NegativeSelfSimilarity(corrected));
    }
    Ok(corrected.sqrt())
}

/// Subtract the per-column mean
pub fn center_columns(x: &ArrayView2<f64>) -> Array2<f64> {
    let means = stats::column_means(x);
    x - &means.insert_axis(Axis(0))
}

/// Per-example squared norm; the diagonal of `X Xᵀ` without forming it
fn sum_squared_rows(x: &ArrayView2<f64>) -> Array1<f64> {
    x.map_axis(Axis(1), |row| row.dot(&row))
}
