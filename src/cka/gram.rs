//! CKA over explicit Gram matrices

use crate::centering::CenteredGram;
use crate::core::{Estimator, Result, SimilarityError};
use crate::kernel::Kernel;
use crate::utils::validation;
use log::debug;
use ndarray::{ArrayBase, Data, Ix2};

/// Centered kernel alignment between two Gram matrices
///
/// Both matrices are centered with the same estimator (`debiased` selects the
/// U-centering), then `⟨Kc, Lc⟩_F / (‖Kc‖_F ‖Lc‖_F)` is returned. The HSIC
/// normalization constants cancel in this ratio and are left out.
///
/// # Errors
/// - [`SimilarityError::NotSquare`] / [`SimilarityError::DimensionMismatch`] for malformed inputs
/// - any centering error (see [`center_gram`](crate::centering::center_gram))
/// - [`SimilarityError::ZeroNormalization`] if a centered matrix is all zeros
pub fn cka<S1, S2>(
    gram_x: &ArrayBase<S1, Ix2>,
    gram_y: &ArrayBase<S2, Ix2>,
    debiased: bool,
) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    validation::ensure_paired_grams(&gram_x.view(), &gram_y.view())?;

    let estimator = Estimator::from_debiased(debiased);
    let centered_x = CenteredGram::new(gram_x, estimator)?;
    let centered_y = CenteredGram::new(gram_y, estimator)?;
    cka_centered(&centered_x, &centered_y)
}

/// CKA between two already centered Gram matrices
///
/// Fails with [`SimilarityError::EstimatorMismatch`] if they were centered
/// with different estimators.
pub fn cka_centered(centered_x: &CenteredGram, centered_y: &CenteredGram) -> Result<f64> {
    let scaled_hsic = centered_x.scaled_hsic(centered_y)?;
    let normalization = centered_x.frobenius_norm() * centered_y.frobenius_norm();
    if normalization == 0.0 {
        return Err(SimilarityError::ZeroNormalization);
    }
    Ok(scaled_hsic / normalization)
}

/// Build both Gram matrices with `kernel` and compare them with [`cka`]
pub fn kernel_cka<K, S1, S2>(
    kernel: &K,
    features_x: &ArrayBase<S1, Ix2>,
    features_y: &ArrayBase<S2, Ix2>,
    debiased: bool,
) -> Result<f64>
where
    K: Kernel,
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let (x, y) = (features_x.view(), features_y.view());
    validation::ensure_same_examples(&x, &y)?;
    debug!(
        "{} kernel CKA: n={}, dx={}, dy={}, debiased={debiased}",
        kernel.name(),
        x.nrows(),
        x.ncols(),
        y.ncols()
    );

    let gram_x = kernel.gram(x)?;
    let gram_y = kernel.gram(y)?;
    cka(&gram_x, &gram_y, debiased)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{linear_kernel, LinearKernel, RBFKernel};
    use ndarray::{array, Array2};

    fn features() -> (Array2<f64>, Array2<f64>) {
        let x = array![
            [1.0, 0.5, -0.2],
            [0.3, -1.2, 0.8],
            [2.0, 0.1, 0.0],
            [-0.7, 0.9, 1.5],
            [0.4, 0.4, -1.1],
            [-1.3, -0.6, 0.2],
        ];
        let y = array![
            [0.9, 1.0],
            [0.1, -0.4],
            [1.7, 0.3],
            [-0.2, 2.1],
            [0.6, -0.9],
            [-1.0, 0.0],
        ];
        (x, y)
    }

    #[test]
    fn test_cka_self_similarity() {
        let (x, _) = features();
        let gram = linear_kernel(&x).unwrap();

        assert!((cka(&gram, &gram, false).unwrap() - 1.0).abs() < 1e-12);
        assert!((cka(&gram, &gram, true).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cka_symmetric_and_bounded() {
        let (x, y) = features();
        let gram_x = linear_kernel(&x).unwrap();
        let gram_y = linear_kernel(&y).unwrap();

        let xy = cka(&gram_x, &gram_y, false).unwrap();
        let yx = cka(&gram_y, &gram_x, false).unwrap();
        assert!((xy - yx).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&xy));
    }

    #[test]
    fn test_cka_size_mismatch() {
        let a = Array2::<f64>::eye(3);
        let b = Array2::<f64>::eye(4);
        assert!(matches!(
            cka(&a, &b, false),
            Err(SimilarityError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_cka_constant_gram() {
        let constant = Array2::<f64>::from_elem((4, 4), 2.0);
        let other = Array2::<f64>::eye(4);
        assert!(matches!(
            cka(&constant, &other, false),
            Err(SimilarityError::ZeroNormalization)
        ));
    }

    #[test]
    fn test_cka_centered_refuses_mixed_estimators() {
        let (x, _) = features();
        let gram = linear_kernel(&x).unwrap();
        let biased = CenteredGram::new(&gram, Estimator::Biased).unwrap();
        let unbiased = CenteredGram::new(&gram, Estimator::Unbiased).unwrap();

        assert!(matches!(
            cka_centered(&biased, &unbiased),
            Err(SimilarityError::EstimatorMismatch { .. })
        ));
    }

    #[test]
    fn test_kernel_cka_matches_explicit_grams() {
        let (x, y) = features();
        let explicit = cka(
            &linear_kernel(&x).unwrap(),
            &linear_kernel(&y).unwrap(),
            false,
        )
        .unwrap();
        let via_kernel = kernel_cka(&LinearKernel::new(), &x, &y, false).unwrap();
        assert!((explicit - via_kernel).abs() < 1e-12);

        let rbf = kernel_cka(&RBFKernel::new(0.5).unwrap(), &x, &y, false).unwrap();
        assert!(rbf.is_finite());
    }

    #[test]
    fn test_kernel_cka_row_mismatch() {
        let (x, _) = features();
        let y = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            kernel_cka(&LinearKernel::new(), &x, &y, false),
            Err(SimilarityError::DimensionMismatch {
                expected: 6,
                actual: 3
            })
        ));
    }
}
