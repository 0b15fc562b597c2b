//! Named view over a fitted OLS regression.

use super::EstimationError;
use crate::core::{CovarianceType, RegressionResult};
use crate::diagnostics::{
    compute_leverage_with_aliased, externally_studentized_residuals, studentized_residuals,
};
use crate::panel::{DesignMatrix, INTERCEPT_NAME};
use crate::solvers::{FittedOls, FittedRegressor, OlsRegressor, Regressor};
use faer::{Col, Mat};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic for classical covariance, z statistic for robust covariance.
    pub statistic: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// A fitted linear model with named parameters.
///
/// The intercept is reported first under the name `const`, followed by the
/// regressors in design order. Aliased regressors carry NaN estimates.
#[derive(Debug, Clone)]
pub struct FittedModel {
    names: Vec<String>,
    design: Mat<f64>,
    fit: FittedOls,
}

impl FittedModel {
    /// Fit `y` on `design` plus an intercept named `const`.
    ///
    /// The estimators call this after assembling their regressors; it is also
    /// the entry point for custom designs.
    pub fn fit(
        design: &DesignMatrix,
        y: &[f64],
        covariance_type: CovarianceType,
        confidence_level: f64,
    ) -> Result<Self, EstimationError> {
        let x = design.to_mat();
        let y = Col::from_fn(y.len(), |i| y[i]);

        let fit = OlsRegressor::builder()
            .covariance_type(covariance_type)
            .confidence_level(confidence_level)
            .build()
            .fit(&x, &y)?;

        let model = Self {
            names: design.names().to_vec(),
            design: x,
            fit,
        };

        let aliased = model.aliased_regressors();
        if !aliased.is_empty() {
            warn!(?aliased, "regressors aliased by rank deficiency; estimates are NaN");
        }
        info!(
            n_observations = model.n_observations(),
            rank = model.result().rank,
            covariance = ?covariance_type,
            "model fitted"
        );

        Ok(model)
    }

    /// Underlying solver output.
    pub fn result(&self) -> &RegressionResult {
        self.fit.result()
    }

    /// Regressor names in design order, without the intercept.
    pub fn regressor_names(&self) -> &[String] {
        &self.names
    }

    /// Parameter names: `const` followed by the regressors.
    pub fn param_names(&self) -> Vec<&str> {
        std::iter::once(INTERCEPT_NAME)
            .chain(self.names.iter().map(String::as_str))
            .collect()
    }

    /// Full coefficient table, intercept first.
    pub fn coefficients(&self) -> Vec<Coefficient> {
        let result = self.result();
        let (conf_low, conf_high) = result
            .intercept_conf_interval
            .unwrap_or((f64::NAN, f64::NAN));

        let mut table = Vec::with_capacity(self.names.len() + 1);
        table.push(Coefficient {
            name: INTERCEPT_NAME.to_string(),
            estimate: result.intercept,
            std_error: result.intercept_std_error.unwrap_or(f64::NAN),
            statistic: result.intercept_t_statistic.unwrap_or(f64::NAN),
            p_value: result.intercept_p_value.unwrap_or(f64::NAN),
            conf_low,
            conf_high,
        });

        let pick = |col: &Option<Col<f64>>, j: usize| col.as_ref().map_or(f64::NAN, |c| c[j]);
        for (j, name) in self.names.iter().enumerate() {
            table.push(Coefficient {
                name: name.clone(),
                estimate: result.coefficients[j],
                std_error: pick(&result.std_errors, j),
                statistic: pick(&result.t_statistics, j),
                p_value: pick(&result.p_values, j),
                conf_low: pick(&result.conf_interval_lower, j),
                conf_high: pick(&result.conf_interval_upper, j),
            });
        }
        table
    }

    /// Coefficient row for `name` (`const` for the intercept).
    pub fn coefficient(&self, name: &str) -> Option<Coefficient> {
        self.coefficients().into_iter().find(|c| c.name == name)
    }

    /// Point estimates, intercept first.
    pub fn params(&self) -> Vec<f64> {
        self.coefficients().iter().map(|c| c.estimate).collect()
    }

    /// Standard errors, intercept first.
    pub fn std_errors(&self) -> Vec<f64> {
        self.coefficients().iter().map(|c| c.std_error).collect()
    }

    /// Confidence bounds `(lower, upper)`, intercept first.
    pub fn conf_int(&self) -> Vec<(f64, f64)> {
        self.coefficients()
            .iter()
            .map(|c| (c.conf_low, c.conf_high))
            .collect()
    }

    /// Regressors dropped for rank deficiency.
    pub fn aliased_regressors(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.result().aliased)
            .filter(|(_, &aliased)| aliased)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn n_observations(&self) -> usize {
        self.result().n_observations
    }

    pub fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    pub fn covariance_type(&self) -> CovarianceType {
        self.result().covariance_type
    }

    pub fn confidence_level(&self) -> f64 {
        self.result().confidence_level
    }

    pub fn residuals(&self) -> &Col<f64> {
        &self.result().residuals
    }

    /// Regressor matrix the model was fit on (no intercept column).
    pub fn design(&self) -> &Mat<f64> {
        &self.design
    }

    /// Hat-matrix diagonal of the fitted design.
    pub fn leverage(&self) -> Col<f64> {
        compute_leverage_with_aliased(&self.design, &self.result().aliased, true)
    }

    /// Internally studentized residuals.
    pub fn studentized_residuals(&self) -> Col<f64> {
        let result = self.result();
        studentized_residuals(&result.residuals, &self.leverage(), result.mse)
    }

    /// Externally studentized (leave-one-out) residuals.
    pub fn externally_studentized_residuals(&self) -> Col<f64> {
        let result = self.result();
        externally_studentized_residuals(
            &result.residuals,
            &self.leverage(),
            result.mse,
            result.n_parameters,
        )
    }
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result();
        let stat = result.statistic_label();
        let level = result.confidence_level;
        let width = self
            .param_names()
            .iter()
            .map(|n| n.len())
            .max()
            .unwrap_or(5)
            .max(5);

        writeln!(
            f,
            "OLS  n = {}  R² = {:.4}  adj. R² = {:.4}  covariance = {:?}",
            result.n_observations, result.r_squared, result.adj_r_squared, result.covariance_type
        )?;
        writeln!(
            f,
            "{:<width$} {:>12} {:>12} {:>9} {:>8} {:>12} {:>12}",
            "",
            "coef",
            "std err",
            stat,
            format!("P>|{stat}|"),
            format!("[{:.3}", (1.0 - level) / 2.0),
            format!("{:.3}]", 1.0 - (1.0 - level) / 2.0),
        )?;
        for c in self.coefficients() {
            writeln!(
                f,
                "{:<width$} {:>12.4} {:>12.4} {:>9.3} {:>8.3} {:>12.4} {:>12.4}",
                c.name, c.estimate, c.std_error, c.statistic, c.p_value, c.conf_low, c.conf_high
            )?;
        }
        Ok(())
    }
}
