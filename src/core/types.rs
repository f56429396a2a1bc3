//! Core type definitions for representation similarity

use serde::{Deserialize, Serialize};

/// Which HSIC estimator a centered Gram matrix (or a score) was computed with.
///
/// Biased and unbiased centerings are not interchangeable: two matrices
/// centered with different estimators must never be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    /// Plain double-centering
    #[default]
    Biased,
    /// U-statistic centering (Székely & Rizzo, 2014)
    Unbiased,
}

impl Estimator {
    /// Map the `debiased` / `unbiased` flag used by the free functions
    pub fn from_debiased(debiased: bool) -> Self {
        if debiased {
            Self::Unbiased
        } else {
            Self::Biased
        }
    }

    /// Whether this is the unbiased estimator
    pub fn is_unbiased(&self) -> bool {
        matches!(self, Self::Unbiased)
    }

    /// Smallest number of examples the centering step accepts
    pub fn min_examples(&self) -> usize {
        match self {
            Self::Biased => 1,
            Self::Unbiased => 3,
        }
    }
}

/// Similarity measures that can be requested from a [`Comparison`](crate::api::Comparison)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// CKA over explicit linear Gram matrices
    LinearCka,
    /// CKA over RBF Gram matrices
    RbfCka,
    /// Linear CKA computed in feature space
    FeatureSpaceLinearCka,
    /// Mean squared canonical correlation
    Cca,
}

impl Metric {
    /// Every metric, in reporting order
    pub const ALL: [Metric; 4] = [
        Metric::LinearCka,
        Metric::RbfCka,
        Metric::FeatureSpaceLinearCka,
        Metric::Cca,
    ];

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::LinearCka => "linear CKA",
            Self::RbfCka => "RBF CKA",
            Self::FeatureSpaceLinearCka => "feature-space linear CKA",
            Self::Cca => "mean squared CCA",
        }
    }

    /// Whether the estimator choice affects this metric
    pub fn uses_estimator(&self) -> bool {
        !matches!(self, Self::Cca)
    }
}

/// Configuration for a comparison between two representations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// HSIC estimator used by every CKA metric
    pub estimator: Estimator,
    /// Bandwidth multiplier for the RBF kernel
    pub rbf_threshold: f64,
    /// Metrics to compute
    pub metrics: Vec<Metric>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            estimator: Estimator::Biased,
            rbf_threshold: 1.0,
            metrics: Metric::ALL.to_vec(),
        }
    }
}
