//! Kernel trait definition

use crate::core::Result;
use ndarray::{Array2, ArrayView2};

/// Kernel that turns a feature matrix into a Gram matrix
///
/// Rows of the input are examples. The output is the symmetric `n x n`
/// matrix of pairwise kernel values between examples.
pub trait Kernel: Send + Sync {
    /// Compute the Gram matrix of `x`
    fn gram(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;

    /// Short name used in logs and reports
    fn name(&self) -> &'static str;
}
