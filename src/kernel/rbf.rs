//! RBF (Radial Basis Function) kernel implementation
//!
//! The kernel is K(x, y) = exp(-||x - y||² / (2σ²)), with the bandwidth
//! derived from the data: σ² = threshold² * median(||xᵢ - xⱼ||²).
//! The median runs over all n² pairs, the zero diagonal included. This is a
//! heuristic and other bandwidth rules exist; this one is kept so scores stay
//! comparable with published CKA numbers.

use crate::core::{Result, SimilarityError};
use crate::kernel::Kernel;
use crate::utils::{stats, validation};
use log::debug;
use ndarray::{Array2, ArrayBase, ArrayView2, Data, Ix2};

/// RBF kernel with a median-distance bandwidth
///
/// The threshold scales the bandwidth as a fraction of the median distance:
/// - smaller threshold: sharper kernel, only close examples look similar
/// - larger threshold: smoother kernel, approaching the linear case
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    threshold: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with the given bandwidth threshold
    ///
    /// # Errors
    /// Returns [`SimilarityError::InvalidParameter`] if threshold is not a
    /// positive finite number
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    /// Get the threshold parameter
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for RBFKernel {
    /// RBF kernel with threshold = 1.0
    fn default() -> Self {
        Self { threshold: 1.0 }
    }
}

impl Kernel for RBFKernel {
    fn gram(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        rbf_kernel(&x, self.threshold)
    }

    fn name(&self) -> &'static str {
        "rbf"
    }
}

/// Compute the RBF Gram matrix of `x`
///
/// # Errors
/// - [`SimilarityError::InvalidParameter`] for a non-positive threshold
/// - [`SimilarityError::EmptyInput`] for an empty matrix
/// - [`SimilarityError::DegenerateBandwidth`] when the median squared distance
///   is zero, e.g. when all examples are identical
pub fn rbf_kernel<S>(x: &ArrayBase<S, Ix2>, threshold: f64) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    validate_threshold(threshold)?;
    let x = x.view();
    validation::ensure_non_empty(&x)?;

    let sq_distances = squared_distances(&x);
    let sq_median = stats::median(&sq_distances.view()).ok_or(SimilarityError::EmptyInput)?;
    if !(sq_median > 0.0) {
        return Err(SimilarityError::DegenerateBandwidth);
    }

    let two_sigma_sq = 2.0 * threshold * threshold * sq_median;
    debug!(
        "RBF kernel: n={}, median squared distance={sq_median:.6}, 2σ²={two_sigma_sq:.6}",
        x.nrows()
    );

    Ok(sq_distances.mapv(|d| (-d / two_sigma_sq).exp()))
}

/// Pairwise squared Euclidean distances between the rows of `x`
///
/// Uses ||xᵢ - xⱼ||² = gᵢᵢ - 2gᵢⱼ + gⱼⱼ with g = X * X^T, so the row
/// differences are never formed. Rounding may leave tiny negative values;
/// they are not clamped.
pub fn squared_distances(x: &ArrayView2<f64>) -> Array2<f64> {
    let dot_products = x.dot(&x.t());
    let sq_norms = dot_products.diag().to_owned();
    let n = x.nrows();

    Array2::from_shape_fn((n, n), |(i, j)| {
        -2.0 * dot_products[[i, j]] + sq_norms[i] + sq_norms[j]
    })
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(SimilarityError::InvalidParameter(format!(
            "RBF threshold must be positive, got: {threshold}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rbf_kernel_creation() {
        let kernel = RBFKernel::new(0.5).unwrap();
        assert_eq!(kernel.threshold(), 0.5);

        let kernel_default = RBFKernel::default();
        assert_eq!(kernel_default.threshold(), 1.0);
        assert_eq!(kernel_default.name(), "rbf");
    }

    #[test]
    fn test_rbf_kernel_trait_takes_view() {
        let x = array![[0.0, 1.0, 9.0], [1.0, 0.0, 9.0], [2.0, 2.0, 9.0]];
        let first_two = x.slice(ndarray::s![.., ..2]);
        let kernel = RBFKernel::new(0.8).unwrap();

        let via_trait = kernel.gram(first_two).unwrap();
        assert_eq!(via_trait, rbf_kernel(&first_two, 0.8).unwrap());
        // The view is still usable afterwards
        assert_eq!(first_two.dim(), (3, 2));
    }

    #[test]
    fn test_rbf_kernel_invalid_threshold() {
        for threshold in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                RBFKernel::new(threshold),
                Err(SimilarityError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_squared_distances() {
        let x = array![[0.0, 0.0], [3.0, 4.0], [1.0, 0.0]];
        let d = squared_distances(&x.view());

        assert_eq!(d[[0, 1]], 25.0);
        assert_eq!(d[[1, 0]], 25.0);
        assert_eq!(d[[0, 2]], 1.0);
        assert_eq!(d[[1, 2]], 20.0);
        for i in 0..3 {
            assert_eq!(d[[i, i]], 0.0);
        }
    }

    #[test]
    fn test_rbf_kernel_bandwidth_uses_full_median() {
        // Squared distances: diagonal 0 (x2), off-diagonal 4 (x2). Median over
        // all four entries is (0 + 4) / 2 = 2, so 2σ² = 4 at threshold 1.
        let x = array![[0.0], [2.0]];
        let gram = rbf_kernel(&x, 1.0).unwrap();

        assert!((gram[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((gram[[0, 1]] - (-1.0_f64).exp()).abs() < 1e-12);
        assert!((gram[[1, 0]] - gram[[0, 1]]).abs() < 1e-12);
    }

    #[test]
    fn test_rbf_kernel_threshold_sharpens() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [-1.0, 0.5]];
        let smooth = rbf_kernel(&x, 2.0).unwrap();
        let sharp = rbf_kernel(&x, 0.5).unwrap();

        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    assert!(sharp[[i, j]] < smooth[[i, j]]);
                }
                assert!(sharp[[i, j]] > 0.0 && sharp[[i, j]] <= 1.0);
            }
        }
    }

    #[test]
    fn test_rbf_kernel_scale_invariant() {
        // The bandwidth tracks the median distance, so rescaling the data
        // leaves the Gram matrix unchanged.
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [-1.0, 0.5]];
        let scaled = &x * 10.0;
        let a = rbf_kernel(&x, 1.0).unwrap();
        let b = rbf_kernel(&scaled, 1.0).unwrap();

        for (u, v) in a.iter().zip(b.iter()) {
            assert!((u - v).abs() < 1e-10);
        }
    }

    #[test]
    fn test_rbf_kernel_degenerate() {
        let x = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        assert!(matches!(
            rbf_kernel(&x, 1.0),
            Err(SimilarityError::DegenerateBandwidth)
        ));
    }
}
