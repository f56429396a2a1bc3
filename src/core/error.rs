//! Error types for similarity computations

use crate::core::Estimator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Input matrix is empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Gram matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Gram matrix must be symmetric: entry ({row}, {col}) differs from its transpose")]
    NotSymmetric { row: usize, col: usize },

    #[error("Gram matrix entry ({row}, {col}) is not finite")]
    NonFiniteValue { row: usize, col: usize },

    #[error("Unbiased estimator needs at least {required} examples, got {actual}")]
    InsufficientExamples { required: usize, actual: usize },

    #[error("Median squared distance is zero; RBF bandwidth is undefined")]
    DegenerateBandwidth,

    #[error("Debiased self-similarity is negative ({0}); too few examples for the unbiased estimator")]
    NegativeSelfSimilarity(f64),

    #[error("Normalization is zero; similarity is undefined")]
    ZeroNormalization,

    #[error("Cannot combine {left:?} and {right:?} centered Gram matrices")]
    EstimatorMismatch { left: Estimator, right: Estimator },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
