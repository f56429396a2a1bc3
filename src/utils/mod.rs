//! Utility functions shared by the similarity measures

use crate::core::{Estimator, Result, SimilarityError};
use ndarray::{Array1, ArrayView2, Axis};

/// Input validation helpers
///
/// Every public similarity function runs its shape checks through these
/// before touching the data, so a mismatched call fails without doing work.
pub mod validation {
    use super::*;

    /// Absolute tolerance of the symmetry check
    pub const SYMMETRY_ATOL: f64 = 1e-8;
    /// Relative tolerance of the symmetry check
    pub const SYMMETRY_RTOL: f64 = 1e-5;

    /// Reject matrices without rows or columns
    pub fn ensure_non_empty(x: &ArrayView2<f64>) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(SimilarityError::EmptyInput);
        }
        Ok(())
    }

    /// Both feature matrices must describe the same examples
    pub fn ensure_same_examples(x: &ArrayView2<f64>, y: &ArrayView2<f64>) -> Result<()> {
        ensure_non_empty(x)?;
        ensure_non_empty(y)?;
        if x.nrows() != y.nrows() {
            return Err(SimilarityError::DimensionMismatch {
                expected: x.nrows(),
                actual: y.nrows(),
            });
        }
        Ok(())
    }

    /// Gram matrices must be square
    pub fn ensure_square(gram: &ArrayView2<f64>) -> Result<()> {
        ensure_non_empty(gram)?;
        if gram.nrows() != gram.ncols() {
            return Err(SimilarityError::NotSquare {
                rows: gram.nrows(),
                cols: gram.ncols(),
            });
        }
        Ok(())
    }

    /// Two Gram matrices over the same examples
    pub fn ensure_paired_grams(gram_x: &ArrayView2<f64>, gram_y: &ArrayView2<f64>) -> Result<()> {
        ensure_square(gram_x)?;
        ensure_square(gram_y)?;
        if gram_x.nrows() != gram_y.nrows() {
            return Err(SimilarityError::DimensionMismatch {
                expected: gram_x.nrows(),
                actual: gram_y.nrows(),
            });
        }
        Ok(())
    }

    /// Check `|g[i,j] - g[j,i]| <= atol + rtol * |g[j,i]|` for every pair.
    ///
    /// Reports the first offending entry. NaN and infinite entries are
    /// reported as [`SimilarityError::NonFiniteValue`] before any symmetry
    /// comparison. The matrix is never repaired.
    pub fn ensure_symmetric(gram: &ArrayView2<f64>) -> Result<()> {
        ensure_square(gram)?;
        if let Some(((row, col), _)) = gram.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimilarityError::NonFiniteValue { row, col });
        }
        let n = gram.nrows();
        for i in 0..n {
            for j in 0..n {
                let a = gram[[i, j]];
                let b = gram[[j, i]];
                if (a - b).abs() > SYMMETRY_ATOL + SYMMETRY_RTOL * b.abs() {
                    return Err(SimilarityError::NotSymmetric { row: i, col: j });
                }
            }
        }
        Ok(())
    }

    /// The unbiased estimator divides by `n - 2`
    pub fn ensure_min_examples(n: usize, estimator: Estimator) -> Result<()> {
        let required = estimator.min_examples();
        if n < required {
            return Err(SimilarityError::InsufficientExamples {
                required,
                actual: n,
            });
        }
        Ok(())
    }
}

/// Summation and order statistics
pub mod stats {
    use super::*;

    /// Neumaier-compensated sum
    pub fn compensated_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
        let mut sum = 0.0;
        let mut compensation = 0.0;
        for value in values {
            let t = sum + value;
            if sum.abs() >= value.abs() {
                compensation += (sum - t) + value;
            } else {
                compensation += (value - t) + sum;
            }
            sum = t;
        }
        sum + compensation
    }

    /// Column sums with compensated accumulation
    pub fn column_sums(x: &ArrayView2<f64>) -> Array1<f64> {
        x.axis_iter(Axis(1))
            .map(|column| compensated_sum(column.iter().copied()))
            .collect()
    }

    /// Column means with compensated accumulation
    pub fn column_means(x: &ArrayView2<f64>) -> Array1<f64> {
        let n = x.nrows() as f64;
        column_sums(x).mapv(|s| s / n)
    }

    /// Median over every entry of the matrix.
    ///
    /// Even counts average the two middle values. Returns `None` for an empty matrix.
    pub fn median(x: &ArrayView2<f64>) -> Option<f64> {
        let mut values: Vec<f64> = x.iter().copied().collect();
        if values.is_empty() {
            return None;
        }
        let even = values.len() % 2 == 0;
        let mid = values.len() / 2;
        let (lower, upper, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
        let upper = *upper;
        if even {
            // `lower` holds the `mid` smallest values, so its maximum is the other middle value
            let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some((below + upper) / 2.0)
        } else {
            Some(upper)
        }
    }

    /// Frobenius inner product of two equally shaped matrices
    pub fn frobenius_inner(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
    }

    /// Frobenius norm
    pub fn frobenius_norm(a: &ArrayView2<f64>) -> f64 {
        a.iter().map(|&x| x * x).sum::<f64>().sqrt()
    }

    /// Squared Frobenius norm
    pub fn frobenius_norm_squared(a: &ArrayView2<f64>) -> f64 {
        a.iter().map(|&x| x * x).sum()
    }
}

/// Seeded synthetic representations for demos, tests and benchmarks
pub mod synthetic {
    use ndarray::Array2;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use rand_distr::StandardNormal;

    /// Matrix of independent standard normal entries
    pub fn gaussian_matrix<R: Rng>(rng: &mut R, rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |_| rng.sample(StandardNormal))
    }

    /// A representation and a noisy copy of it.
    ///
    /// Returns `(x, y)` where `x` is `examples x features` standard normal and
    /// `y = x + e` with independent standard normal noise `e`.
    pub fn noisy_pair(seed: u64, examples: usize, features: usize) -> (Array2<f64>, Array2<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let x = gaussian_matrix(&mut rng, examples, features);
        let noise = gaussian_matrix(&mut rng, examples, features);
        let y = &x + &noise;
        (x, y)
    }
}
