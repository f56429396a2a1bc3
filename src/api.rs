//! High-level API for comparing two representations
//!
//! This module bundles the individual similarity measures behind a builder
//! that runs several of them over one pair of feature matrices.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use repsim::api::Comparison;
//! use repsim::core::Metric;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = Comparison::new()
//!     .with_debiased(true)
//!     .with_rbf_threshold(0.5)
//!     .compare_files("layer3.csv", "layer4.csv")?;
//!
//! println!("Linear CKA: {:.3}", report.get(Metric::LinearCka).unwrap_or(f64::NAN));
//! # Ok(())
//! # }
//! ```

use crate::cca::cca;
use crate::cka::{cka, feature_space_linear_cka, kernel_cka};
use crate::core::{ComparisonConfig, Estimator, Metric, Result, SimilarityError};
use crate::data::CSVFeatures;
use crate::kernel::{linear_kernel, RBFKernel};
use crate::utils::validation;
use log::{debug, info, warn};
use ndarray::{ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Below this many examples debiased scores are dominated by sampling noise
const SMALL_SAMPLE_WARNING: usize = 10;

/// Builder for a multi-metric comparison
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    config: ComparisonConfig,
}

impl Comparison {
    /// Create a comparison with the default configuration
    /// (biased estimator, RBF threshold 1.0, every metric)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a comparison from an explicit configuration
    pub fn with_config(config: ComparisonConfig) -> Self {
        Self { config }
    }

    /// Set the HSIC estimator used by every CKA metric
    pub fn with_estimator(mut self, estimator: Estimator) -> Self {
        self.config.estimator = estimator;
        self
    }

    /// Shorthand for `with_estimator(Estimator::from_debiased(debiased))`
    pub fn with_debiased(self, debiased: bool) -> Self {
        self.with_estimator(Estimator::from_debiased(debiased))
    }

    /// Set the RBF bandwidth threshold
    pub fn with_rbf_threshold(mut self, threshold: f64) -> Self {
        self.config.rbf_threshold = threshold;
        self
    }

    /// Restrict the metrics to compute
    pub fn with_metrics(mut self, metrics: &[Metric]) -> Self {
        self.config.metrics = metrics.to_vec();
        self
    }

    /// Current configuration
    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Compute every configured metric for `features_x` against `features_y`
    ///
    /// Rows of the two matrices must describe the same examples in the same
    /// order. The first failing metric aborts the comparison.
    pub fn compare<S1, S2>(
        &self,
        features_x: &ArrayBase<S1, Ix2>,
        features_y: &ArrayBase<S2, Ix2>,
    ) -> Result<SimilarityReport>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        let (x, y) = (features_x.view(), features_y.view());
        validation::ensure_same_examples(&x, &y)?;
        if self.config.metrics.is_empty() {
            return Err(SimilarityError::InvalidParameter(
                "At least one metric must be requested".to_string(),
            ));
        }

        let debiased = self.config.estimator.is_unbiased();
        let n = x.nrows();
        if debiased && n < SMALL_SAMPLE_WARNING {
            warn!("Debiased estimates from only {n} examples are dominated by sampling noise");
        }
        info!(
            "Comparing representations: n={n}, dx={}, dy={}, estimator={:?}",
            x.ncols(),
            y.ncols(),
            self.config.estimator
        );

        let mut scores = Vec::with_capacity(self.config.metrics.len());
        for &metric in &self.config.metrics {
            let value = match metric {
                Metric::LinearCka => cka(&linear_kernel(&x)?, &linear_kernel(&y)?, debiased)?,
                Metric::RbfCka => {
                    let kernel = RBFKernel::new(self.config.rbf_threshold)?;
                    kernel_cka(&kernel, &x, &y, debiased)?
                }
                Metric::FeatureSpaceLinearCka => feature_space_linear_cka(&x, &y, debiased)?,
                Metric::Cca => cca(&x, &y)?,
            };
            debug!("{}: {value:.6}", metric.label());
            scores.push(MetricScore { metric, value });
        }

        Ok(SimilarityReport {
            n_examples: n,
            features_x: x.ncols(),
            features_y: y.ncols(),
            estimator: self.config.estimator,
            rbf_threshold: self.config.rbf_threshold,
            scores,
        })
    }

    /// Load both matrices from CSV files and compare them
    pub fn compare_files<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        path_x: P1,
        path_y: P2,
    ) -> Result<SimilarityReport> {
        let x = CSVFeatures::from_file(path_x)?;
        let y = CSVFeatures::from_file(path_y)?;
        self.compare(x.matrix(), y.matrix())
    }
}

/// One computed score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub metric: Metric,
    pub value: f64,
}

/// Scores for one pair of representations plus the settings that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub n_examples: usize,
    pub features_x: usize,
    pub features_y: usize,
    pub estimator: Estimator,
    pub rbf_threshold: f64,
    pub scores: Vec<MetricScore>,
}

impl SimilarityReport {
    /// Score for a metric, if it was computed
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.scores
            .iter()
            .find(|score| score.metric == metric)
            .map(|score| score.value)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimilarityError::SerializationError(e.to_string()))
    }

    /// Print a human readable summary to stdout
    pub fn print_summary(&self) {
        println!("=== Representation Similarity ===");
        println!("Examples: {}", self.n_examples);
        println!("Features: {} vs {}", self.features_x, self.features_y);
        println!("Estimator: {:?}", self.estimator);
        if self.get(Metric::RbfCka).is_some() {
            println!("RBF threshold: {}", self.rbf_threshold);
        }
        println!("Scores:");
        for score in &self.scores {
            println!("  {:<26} {:.6}", score.metric.label(), score.value);
        }
    }
}

/// Convenience functions for one-off comparisons
pub mod quick {
    use super::*;

    /// Biased linear CKA, computed in feature space
    pub fn linear_cka<S1, S2>(x: &ArrayBase<S1, Ix2>, y: &ArrayBase<S2, Ix2>) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        feature_space_linear_cka(x, y, false)
    }

    /// Debiased linear CKA, computed in feature space
    pub fn debiased_linear_cka<S1, S2>(
        x: &ArrayBase<S1, Ix2>,
        y: &ArrayBase<S2, Ix2>,
    ) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        feature_space_linear_cka(x, y, true)
    }

    /// Biased RBF CKA with the given threshold
    pub fn rbf_cka<S1, S2>(x: &ArrayBase<S1, Ix2>, y: &ArrayBase<S2, Ix2>, threshold: f64) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        kernel_cka(&RBFKernel::new(threshold)?, x, y, false)
    }

    /// Mean squared canonical correlation
    pub fn cca<S1, S2>(x: &ArrayBase<S1, Ix2>, y: &ArrayBase<S2, Ix2>) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        crate::cca::cca(x, y)
    }

    /// Every metric with default settings
    pub fn compare_all<S1, S2>(
        x: &ArrayBase<S1, Ix2>,
        y: &ArrayBase<S2, Ix2>,
    ) -> Result<SimilarityReport>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        Comparison::new().compare(x, y)
    }
}
