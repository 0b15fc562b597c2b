//! Ordinary Least Squares regression solver.

use crate::core::{CovarianceType, RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::inference::{CoefficientInference, ParameterCovariance};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{center_columns, center_vector, detect_constant_columns};
use faer::linalg::solvers::SolveLstsq;
use faer::{Col, Mat};
use tracing::debug;

/// Relative residual norm below which a column counts as collinear.
const COLLINEARITY_TOLERANCE: f64 = 1e-7;

/// Ordinary Least Squares regression with an intercept.
///
/// Constant columns and columns collinear with earlier ones are aliased: their
/// coefficients are NaN and the rest of the model is fit without them, so of
/// two collinear columns the earlier one is kept. Standard errors follow the
/// configured [`CovarianceType`].
///
/// # Example
///
/// ```rust,ignore
/// use causal_tools::core::CovarianceType;
/// use causal_tools::solvers::{FittedRegressor, OlsRegressor, Regressor};
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(100, 2, |i, j| ((i * (j + 1)) % 7) as f64);
/// let y = Col::from_fn(100, |i| 1.0 + 2.0 * x[(i, 0)]);
///
/// let fitted = OlsRegressor::builder()
///     .covariance_type(CovarianceType::HC3)
///     .build()
///     .fit(&x, &y)?;
///
/// println!("R² = {}", fitted.r_squared());
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }

    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n_samples,
                y_len: y.nrows(),
            });
        }

        let needed = (n_features + 1).max(2);
        if n_samples < needed {
            return Err(RegressionError::InsufficientObservations {
                needed,
                got: n_samples,
            });
        }

        let constant_cols = detect_constant_columns(x, self.options.rank_tolerance);
        let (x_centered, x_means) = center_columns(x);
        let (y_centered, y_mean) = center_vector(y);

        let (coefficients, aliased, rank) =
            solve_with_qr(&x_centered, &y_centered, &constant_cols);

        // Aliased columns drop out of the linear predictor
        let beta = Col::from_fn(n_features, |j| {
            if aliased[j] {
                0.0
            } else {
                coefficients[j]
            }
        });
        let intercept = y_mean - (0..n_features).map(|j| x_means[j] * beta[j]).sum::<f64>();
        let xb = x * &beta;
        let fitted_values = Col::from_fn(n_samples, |i| intercept + xb[i]);
        let residuals = Col::from_fn(n_samples, |i| y[i] - fitted_values[i]);

        let mut result = RegressionResult::empty(n_features, n_samples);
        result.coefficients = coefficients;
        result.intercept = intercept;
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.rank = rank;
        result.n_parameters = rank + 1;
        result.aliased = aliased;
        self.fill_fit_statistics(&y_centered, &mut result);
        self.compute_inference(x, &mut result);

        debug!(
            n_samples,
            n_features,
            rank,
            covariance = ?self.options.covariance_type,
            "ols fit complete"
        );

        Ok(FittedOls {
            options: self.options.clone(),
            result,
        })
    }
}

/// Least squares on centred columns.
///
/// The unpivoted QR keeps the column order, so `|R_jj|` is the norm of column
/// `j` orthogonal to every earlier column. A column whose `|R_jj|` is
/// negligible against its own norm is aliased. The remaining columns are
/// solved through a second QR of the reduced design.
fn solve_with_qr(
    x: &Mat<f64>,
    y: &Col<f64>,
    constant_cols: &[bool],
) -> (Col<f64>, Vec<bool>, usize) {
    let n_features = x.ncols();
    let mut coefficients = Col::from_fn(n_features, |_| f64::NAN);
    if n_features == 0 {
        return (coefficients, Vec::new(), 0);
    }

    let qr = x.qr();
    let r = qr.thin_R();
    let aliased: Vec<bool> = (0..n_features)
        .map(|j| {
            let column_norm = x.col(j).norm_l2();
            constant_cols[j]
                || column_norm == 0.0
                || r[(j, j)].abs() <= COLLINEARITY_TOLERANCE * column_norm
        })
        .collect();

    let kept: Vec<usize> = (0..n_features).filter(|&j| !aliased[j]).collect();
    if kept.is_empty() {
        return (coefficients, aliased, 0);
    }

    let reduced = Mat::from_fn(x.nrows(), kept.len(), |i, c| x[(i, kept[c])]);
    let beta = reduced.qr().solve_lstsq(y);
    for (c, &j) in kept.iter().enumerate() {
        coefficients[j] = beta[c];
    }

    (coefficients, aliased, kept.len())
}

impl OlsRegressor {
    /// R², adjusted R² and MSE. `y_centered` gives the total sum of squares.
    fn fill_fit_statistics(&self, y_centered: &Col<f64>, result: &mut RegressionResult) {
        let n = result.n_observations;
        let tss: f64 = y_centered.iter().map(|v| v * v).sum();
        let rss = result.rss();

        result.r_squared = if tss > 0.0 {
            (1.0 - rss / tss).clamp(0.0, 1.0)
        } else if rss < 1e-10 {
            1.0
        } else {
            0.0
        };

        let df_resid = result.residual_df() as f64;
        let df_total = (n - 1) as f64;
        result.adj_r_squared = if df_resid > 0.0 {
            1.0 - (1.0 - result.r_squared) * df_total / df_resid
        } else {
            f64::NAN
        };
        result.mse = if df_resid > 0.0 {
            rss / df_resid
        } else {
            f64::NAN
        };

        result.confidence_level = self.options.confidence_level;
        result.covariance_type = self.options.covariance_type;
        result.uses_t = self.options.uses_t();
    }

    /// Covariance, standard errors, statistics, p-values and intervals.
    ///
    /// Leaves the inference fields as `None` when the residual degrees of
    /// freedom are exhausted or the reduced design is singular.
    fn compute_inference(&self, x: &Mat<f64>, result: &mut RegressionResult) {
        if result.residual_df() == 0 || !result.mse.is_finite() {
            return;
        }

        let covariance = match ParameterCovariance::compute(
            x,
            &result.residuals,
            result.mse,
            &result.aliased,
            self.options.covariance_type,
        ) {
            Ok(cov) => cov,
            Err(reason) => {
                debug!(reason, "skipping inference");
                return;
            }
        };

        let level = self.options.confidence_level;
        let distribution = result.distribution();
        let se_full = ParameterCovariance::std_errors(&covariance);
        let se = Col::from_fn(result.coefficients.nrows(), |j| se_full[j + 1]);

        let statistics = CoefficientInference::t_statistics(&result.coefficients, &se);
        let p_values = CoefficientInference::p_values(&statistics, distribution);
        let (lower, upper) = CoefficientInference::confidence_intervals(
            &result.coefficients,
            &se,
            distribution,
            level,
        );

        let se_int = se_full[0];
        let stat_int = CoefficientInference::statistic(result.intercept, se_int);
        let half_width = distribution.critical_value(level) * se_int;
        result.intercept_std_error = Some(se_int);
        result.intercept_t_statistic = Some(stat_int);
        result.intercept_p_value = Some(distribution.two_sided_p_value(stat_int));
        result.intercept_conf_interval =
            Some((result.intercept - half_width, result.intercept + half_width));

        result.covariance = Some(covariance);
        result.std_errors = Some(se);
        result.t_statistics = Some(statistics);
        result.p_values = Some(p_values);
        result.conf_interval_lower = Some(lower);
        result.conf_interval_upper = Some(upper);
    }
}

/// A fitted OLS regression model.
#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
}

impl FittedOls {
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }
}

impl FittedRegressor for FittedOls {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `OlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Set the relative tolerance for constant-column detection.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Set the covariance estimator for standard errors.
    pub fn covariance_type(mut self, covariance_type: CovarianceType) -> Self {
        self.builder = self.builder.covariance_type(covariance_type);
        self
    }

    /// Build the OLS regressor. Options are validated when fitting.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}
