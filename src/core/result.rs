//! Output of an OLS fit.

use super::options::CovarianceType;
use crate::inference::TestDistribution;
use faer::{Col, Mat};

/// Everything an OLS fit produces, indexed by design column.
///
/// Inference fields are `None` when the residual degrees of freedom are
/// exhausted. Entries of aliased columns are NaN throughout.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    /// Coefficients of the design columns, NaN where aliased.
    pub coefficients: Col<f64>,
    pub intercept: f64,
    pub residuals: Col<f64>,
    pub fitted_values: Col<f64>,

    /// Number of non-aliased design columns.
    pub rank: usize,
    /// `rank + 1` for the intercept.
    pub n_parameters: usize,
    pub n_observations: usize,
    /// Constant or collinear columns.
    pub aliased: Vec<bool>,

    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// RSS over residual degrees of freedom.
    pub mse: f64,

    pub covariance_type: CovarianceType,
    /// t statistics when true, z statistics otherwise.
    pub uses_t: bool,
    /// Parameter covariance, intercept first. Aliased rows and columns are NaN.
    pub covariance: Option<Mat<f64>>,
    pub std_errors: Option<Col<f64>>,
    pub t_statistics: Option<Col<f64>>,
    pub p_values: Option<Col<f64>>,
    pub conf_interval_lower: Option<Col<f64>>,
    pub conf_interval_upper: Option<Col<f64>>,
    pub intercept_std_error: Option<f64>,
    pub intercept_t_statistic: Option<f64>,
    pub intercept_p_value: Option<f64>,
    pub intercept_conf_interval: Option<(f64, f64)>,
    pub confidence_level: f64,
}

impl RegressionResult {
    /// A result with no fit yet, filled in by the solver.
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: 0.0,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            rank: 0,
            n_parameters: 0,
            n_observations,
            aliased: vec![false; n_features],
            r_squared: 0.0,
            adj_r_squared: 0.0,
            mse: 0.0,
            covariance_type: CovarianceType::NonRobust,
            uses_t: true,
            covariance: None,
            std_errors: None,
            t_statistics: None,
            p_values: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            intercept_std_error: None,
            intercept_t_statistic: None,
            intercept_p_value: None,
            intercept_conf_interval: None,
            confidence_level: 0.95,
        }
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Check if any coefficients are aliased.
    pub fn has_aliased(&self) -> bool {
        self.aliased.iter().any(|&a| a)
    }

    /// Reference distribution of the coefficient tests.
    pub fn distribution(&self) -> TestDistribution {
        if self.uses_t {
            TestDistribution::StudentT(self.residual_df() as f64)
        } else {
            TestDistribution::Normal
        }
    }

    /// `"t"` or `"z"`, for table headers.
    pub fn statistic_label(&self) -> &'static str {
        if self.uses_t {
            "t"
        } else {
            "z"
        }
    }

    /// Residual sum of squares (RSS).
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r.powi(2)).sum()
    }
}
