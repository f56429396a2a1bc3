//! Centered kernel alignment (CKA)
//!
//! Two routes to the same number:
//!
//! - [`cka`]: any kernel, through explicit `n x n` Gram matrices
//! - [`feature_space_linear_cka`]: linear kernel only, through `d x d`
//!   cross-covariances

pub mod feature_space;
pub mod gram;

pub use self::feature_space::*;
pub use self::gram::*;
