//! Linear kernel implementation

use crate::core::Result;
use crate::kernel::Kernel;
use crate::utils::validation;
use ndarray::{Array2, ArrayBase, ArrayView2, Data, Ix2};

/// Linear kernel: K = X * X^T
///
/// Each entry is the dot product between two examples. Costs O(n²d) time and
/// O(n²) memory; when only linear CKA is needed, prefer
/// [`feature_space_linear_cka`](crate::cka::feature_space_linear_cka).
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn gram(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        linear_kernel(&x)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Compute the linear Gram matrix `X * X^T`
pub fn linear_kernel<S>(x: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    validation::ensure_non_empty(&x.view())?;
    Ok(x.dot(&x.t()))
}
