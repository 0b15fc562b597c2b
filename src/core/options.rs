//! Regression options and configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Covariance estimator used for standard errors.
///
/// `NonRobust` is the classical homoskedastic estimator `σ²(X'X)⁻¹`. The `HC*`
/// variants are heteroskedasticity-consistent sandwich estimators that differ
/// only in how each squared residual is rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CovarianceType {
    /// Classical OLS covariance.
    #[default]
    NonRobust,
    /// White's estimator, ω = e².
    HC0,
    /// Degrees-of-freedom corrected, ω = e²·n/(n−k).
    HC1,
    /// Leverage corrected, ω = e²/(1−h).
    HC2,
    /// Jackknife-like, ω = e²/(1−h)².
    HC3,
}

impl CovarianceType {
    /// Whether this is a sandwich (heteroskedasticity-consistent) estimator.
    pub fn is_robust(self) -> bool {
        !matches!(self, CovarianceType::NonRobust)
    }

    /// Pick HC3 or the classical estimator from a boolean switch.
    pub fn from_hc3_flag(hc3_se: bool) -> Self {
        if hc3_se {
            CovarianceType::HC3
        } else {
            CovarianceType::NonRobust
        }
    }
}

/// Configuration of an OLS fit. The model always carries an intercept.
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Confidence level for confidence intervals (default: 0.95).
    pub confidence_level: f64,
    /// Relative spread below which a regressor counts as constant.
    pub rank_tolerance: f64,
    /// Covariance estimator for standard errors (default: non-robust).
    pub covariance_type: CovarianceType,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            rank_tolerance: 1e-10,
            covariance_type: CovarianceType::NonRobust,
        }
    }
}

/// Errors that can occur when validating regression options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("rank_tolerance must be positive, got {0}")]
    InvalidRankTolerance(f64),
}

impl RegressionOptions {
    /// Create a new builder for regression options.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Whether inference uses the t distribution: classical covariance does,
    /// sandwich estimators use the normal distribution.
    pub fn uses_t(&self) -> bool {
        !self.covariance_type.is_robust()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if self.rank_tolerance <= 0.0 || !self.rank_tolerance.is_finite() {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the relative tolerance for constant-column detection.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Set the covariance estimator.
    pub fn covariance_type(mut self, covariance_type: CovarianceType) -> Self {
        self.options.covariance_type = covariance_type;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RegressionOptions::default();
        assert!((opts.confidence_level - 0.95).abs() < 1e-10);
        assert_eq!(opts.covariance_type, CovarianceType::NonRobust);
        assert!(opts.uses_t());
    }

    #[test]
    fn test_robust_uses_normal() {
        let opts = RegressionOptions::builder()
            .covariance_type(CovarianceType::HC3)
            .build()
            .unwrap();
        assert!(!opts.uses_t());
    }

    #[test]
    fn test_hc3_flag() {
        assert_eq!(CovarianceType::from_hc3_flag(true), CovarianceType::HC3);
        assert_eq!(
            CovarianceType::from_hc3_flag(false),
            CovarianceType::NonRobust
        );
        assert!(CovarianceType::HC1.is_robust());
        assert!(!CovarianceType::NonRobust.is_robust());
    }

    #[test]
    fn test_validation_invalid_confidence_level() {
        for level in [0.0, 1.0, 1.5] {
            let result = RegressionOptions::builder().confidence_level(level).build();
            assert!(matches!(
                result,
                Err(OptionsError::InvalidConfidenceLevel(_))
            ));
        }
    }

    #[test]
    fn test_validation_invalid_rank_tolerance() {
        let result = RegressionOptions::builder().rank_tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidRankTolerance(_))));
    }

    #[test]
    fn test_builder_new() {
        let opts = RegressionOptionsBuilder::new().build_unchecked();
        assert_eq!(opts.rank_tolerance, 1e-10);
    }
}
