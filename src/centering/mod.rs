//! Gram matrix centering
//!
//! Two centerings are provided:
//!
//! - **Biased**: plain double-centering `H K H` with `H = I - 11ᵀ/n`.
//! - **Unbiased**: the U-centering of Székely & Rizzo (2014). The diagonal is
//!   excluded from the means and zeroed afterwards. Inner products of
//!   U-centered matrices give the unbiased HSIC estimator; this form is
//!   numerically steadier than the estimator of Song et al. (2007).
//!
//! Results of the two centerings must never be combined. [`CenteredGram`]
//! carries the estimator alongside the matrix and refuses mixed pairs.

use crate::core::{Estimator, Result, SimilarityError};
use crate::utils::{stats, validation};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Ix2};

/// Center a symmetric Gram matrix
///
/// `unbiased` selects the U-centering (requires at least 3 examples).
///
/// # Errors
/// - [`SimilarityError::NotSquare`] / [`SimilarityError::EmptyInput`] for a malformed matrix
/// - [`SimilarityError::NonFiniteValue`] if `gram` contains NaN or an infinity
/// - [`SimilarityError::NotSymmetric`] if `gram` is not symmetric within tolerance
/// - [`SimilarityError::InsufficientExamples`] for the unbiased path with n < 3
pub fn center_gram<S>(gram: &ArrayBase<S, Ix2>, unbiased: bool) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    center(&gram.view(), Estimator::from_debiased(unbiased))
}

fn center(gram: &ArrayView2<f64>, estimator: Estimator) -> Result<Array2<f64>> {
    validation::ensure_symmetric(gram)?;
    let n = gram.nrows();
    validation::ensure_min_examples(n, estimator)?;

    let mut centered = gram.to_owned();
    let means = match estimator {
        Estimator::Biased => {
            let mut means = stats::column_means(&centered.view());
            let grand_mean = stats::compensated_sum(means.iter().copied()) / n as f64;
            means -= grand_mean / 2.0;
            means
        }
        Estimator::Unbiased => {
            centered.diag_mut().fill(0.0);
            let mut means: Array1<f64> = stats::column_sums(&centered.view()) / (n - 2) as f64;
            let total = stats::compensated_sum(means.iter().copied());
            means -= total / (2.0 * (n - 1) as f64);
            means
        }
    };

    for ((i, j), value) in centered.indexed_iter_mut() {
        *value = *value - means[i] - means[j];
    }
    if estimator.is_unbiased() {
        centered.diag_mut().fill(0.0);
    }

    Ok(centered)
}

/// A centered Gram matrix tagged with the estimator that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct CenteredGram {
    matrix: Array2<f64>,
    estimator: Estimator,
}

impl CenteredGram {
    /// Center `gram` with the given estimator
    pub fn new<S>(gram: &ArrayBase<S, Ix2>, estimator: Estimator) -> Result<Self>
    where
        S: Data<Elem = f64>,
    {
        let matrix = center(&gram.view(), estimator)?;
        Ok(Self { matrix, estimator })
    }

    /// The centered matrix
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Consume and return the centered matrix
    pub fn into_inner(self) -> Array2<f64> {
        self.matrix
    }

    /// Estimator used for the centering
    pub fn estimator(&self) -> Estimator {
        self.estimator
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    /// Always false; empty Gram matrices are rejected on construction
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Frobenius norm of the centered matrix
    pub fn frobenius_norm(&self) -> f64 {
        stats::frobenius_norm(&self.matrix.view())
    }

    /// Frobenius inner product with another centered matrix.
    ///
    /// This is HSIC up to the (n-1)² or n(n-3) normalization.
    pub fn scaled_hsic(&self, other: &CenteredGram) -> Result<f64> {
        if self.estimator != other.estimator {
            return Err(SimilarityError::EstimatorMismatch {
                left: self.estimator,
                right: other.estimator,
            });
        }
        if self.len() != other.len() {
            return Err(SimilarityError::DimensionMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(stats::frobenius_inner(
            &self.matrix.view(),
            &other.matrix.view(),
        ))
    }
}

/// Hilbert-Schmidt Independence Criterion between two Gram matrices
///
/// Biased: `tr(K H L H) / (n-1)²`. Unbiased: U-centered inner product over
/// `n(n-3)`, which needs at least 4 examples.
///
/// Shapes are checked before either matrix is centered.
pub fn hsic<S1, S2>(
    gram_x: &ArrayBase<S1, Ix2>,
    gram_y: &ArrayBase<S2, Ix2>,
    estimator: Estimator,
) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    validation::ensure_paired_grams(&gram_x.view(), &gram_y.view())?;
    let n = gram_x.nrows();
    if estimator.is_unbiased() && n < 4 {
        return Err(SimilarityError::InsufficientExamples {
            required: 4,
            actual: n,
        });
    }

    let centered_x = CenteredGram::new(gram_x, estimator)?;
    let centered_y = CenteredGram::new(gram_y, estimator)?;
    let scaled = centered_x.scaled_hsic(&centered_y)?;

    let n = n as f64;
    let normalization = match estimator {
        Estimator::Biased => (n - 1.0) * (n - 1.0),
        Estimator::Unbiased => n * (n - 3.0),
    };
    Ok(scaled / normalization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::linear_kernel;
    use ndarray::{array, Axis};

    fn sample_gram() -> Array2<f64> {
        let x = array![
            [1.0, 0.5, -0.2],
            [0.3, -1.2, 0.8],
            [2.0, 0.1, 0.0],
            [-0.7, 0.9, 1.5],
            [0.4, 0.4, -1.1],
        ];
        linear_kernel(&x).unwrap()
    }

    fn assert_margins_vanish(centered: &Array2<f64>) {
        for sum in centered.sum_axis(Axis(0)).iter() {
            assert!(sum.abs() < 1e-10, "column sum {sum}");
        }
        for sum in centered.sum_axis(Axis(1)).iter() {
            assert!(sum.abs() < 1e-10, "row sum {sum}");
        }
    }

    #[test]
    fn test_biased_centering_known_values() {
        let gram = array![[2.0, 1.0], [1.0, 2.0]];
        let centered = center_gram(&gram, false).unwrap();

        assert_eq!(centered, array![[0.5, -0.5], [-0.5, 0.5]]);
    }

    #[test]
    fn test_biased_centering_margins() {
        let centered = center_gram(&sample_gram(), false).unwrap();
        assert_margins_vanish(&centered);
    }

    #[test]
    fn test_unbiased_centering_margins_and_diagonal() {
        let centered = center_gram(&sample_gram(), true).unwrap();

        assert_margins_vanish(&centered);
        for i in 0..centered.nrows() {
            assert_eq!(centered[[i, i]], 0.0);
        }
    }

    #[test]
    fn test_unbiased_centering_ignores_diagonal() {
        let gram = sample_gram();
        let mut shifted = gram.clone();
        shifted.diag_mut().mapv_inplace(|v| v + 10.0);

        let a = center_gram(&gram, true).unwrap();
        let b = center_gram(&shifted, true).unwrap();
        for (u, v) in a.iter().zip(b.iter()) {
            assert!((u - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_centering_preserves_symmetry() {
        for unbiased in [false, true] {
            let centered = center_gram(&sample_gram(), unbiased).unwrap();
            for i in 0..5 {
                for j in 0..5 {
                    assert!((centered[[i, j]] - centered[[j, i]]).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_centering_rejects_asymmetric() {
        let gram = array![[1.0, 2.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(matches!(
            center_gram(&gram, false),
            Err(SimilarityError::NotSymmetric { row: 0, col: 1 })
        ));
    }

    #[test]
    fn test_centering_rejects_nan() {
        let mut gram = sample_gram();
        gram[[2, 3]] = f64::NAN;
        gram[[3, 2]] = f64::NAN;
        for unbiased in [false, true] {
            assert!(matches!(
                center_gram(&gram, unbiased),
                Err(SimilarityError::NonFiniteValue { row: 2, col: 3 })
            ));
        }
    }

    #[test]
    fn test_centering_rejects_non_square() {
        let gram = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            center_gram(&gram, false),
            Err(SimilarityError::NotSquare { rows: 3, cols: 2 })
        ));
    }

    #[test]
    fn test_unbiased_centering_needs_three_examples() {
        let gram = array![[1.0, 0.5], [0.5, 1.0]];
        assert!(matches!(
            center_gram(&gram, true),
            Err(SimilarityError::InsufficientExamples {
                required: 3,
                actual: 2
            })
        ));
        assert!(center_gram(&gram, false).is_ok());
    }

    #[test]
    fn test_centered_gram_tracks_estimator() {
        let gram = sample_gram();
        let biased = CenteredGram::new(&gram, Estimator::Biased).unwrap();
        let unbiased = CenteredGram::new(&gram, Estimator::Unbiased).unwrap();

        assert_eq!(biased.estimator(), Estimator::Biased);
        assert_eq!(unbiased.estimator(), Estimator::Unbiased);
        assert_eq!(biased.len(), 5);
        assert!(!biased.is_empty());

        assert!(matches!(
            biased.scaled_hsic(&unbiased),
            Err(SimilarityError::EstimatorMismatch {
                left: Estimator::Biased,
                right: Estimator::Unbiased
            })
        ));

        let self_product = biased.scaled_hsic(&biased).unwrap();
        let norm = biased.frobenius_norm();
        assert!((self_product - norm * norm).abs() < 1e-10);
    }

    #[test]
    fn test_centered_gram_size_mismatch() {
        let small = CenteredGram::new(&Array2::<f64>::eye(3), Estimator::Biased).unwrap();
        let large = CenteredGram::new(&Array2::<f64>::eye(4), Estimator::Biased).unwrap();
        assert!(matches!(
            small.scaled_hsic(&large),
            Err(SimilarityError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_biased_hsic_matches_trace_formula() {
        let gram = sample_gram();
        let n = gram.nrows();
        let h = Array2::<f64>::eye(n) - Array2::<f64>::from_elem((n, n), 1.0 / n as f64);
        let khlh = gram.dot(&h).dot(&gram).dot(&h);
        let expected = khlh.diag().sum() / ((n - 1) * (n - 1)) as f64;

        let value = hsic(&gram, &gram, Estimator::Biased).unwrap();
        assert!((value - expected).abs() < 1e-10 * expected.abs().max(1.0));
    }

    #[test]
    fn test_unbiased_hsic_needs_four_examples() {
        let gram = Array2::<f64>::eye(3);
        assert!(matches!(
            hsic(&gram, &gram, Estimator::Unbiased),
            Err(SimilarityError::InsufficientExamples {
                required: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_hsic_checks_shapes_first() {
        let empty = Array2::<f64>::zeros((0, 0));
        assert!(matches!(
            hsic(&empty, &empty, Estimator::Unbiased),
            Err(SimilarityError::EmptyInput)
        ));

        let rect = Array2::<f64>::zeros((3, 5));
        assert!(matches!(
            hsic(&rect, &rect, Estimator::Unbiased),
            Err(SimilarityError::NotSquare { rows: 3, cols: 5 })
        ));

        // An asymmetric second matrix would fail centering; the size check wins
        let small = Array2::<f64>::eye(5);
        let mut large = Array2::<f64>::eye(6);
        large[[0, 1]] = 7.0;
        assert!(matches!(
            hsic(&small, &large, Estimator::Biased),
            Err(SimilarityError::DimensionMismatch {
                expected: 5,
                actual: 6
            })
        ));
    }
}
