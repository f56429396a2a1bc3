//! Representation similarity: centered kernel alignment (CKA) and CCA
//!
//! Based on "Similarity of Neural Network Representations Revisited" by
//! Kornblith, Norouzi, Lee and Hinton (2019).
//!
//! All functions are pure and take dense `ndarray` matrices whose rows are
//! examples. Two matrices being compared must have the same rows in the same
//! order; their feature counts may differ.

pub mod api;
pub mod cca;
pub mod centering;
pub mod cka;
pub mod core;
pub mod data;
pub mod kernel;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{Comparison, MetricScore, SimilarityReport};
pub use crate::cca::cca;
pub use crate::centering::{center_gram, hsic, CenteredGram};
pub use crate::cka::{
    cka, debiased_dot_product_similarity, feature_space_linear_cka, kernel_cka,
};
pub use crate::core::{ComparisonConfig, Estimator, Metric, Result, SimilarityError};
pub use crate::data::CSVFeatures;
pub use crate::kernel::{linear_kernel, rbf_kernel, Kernel, LinearKernel, RBFKernel};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
