//! Difference-in-differences estimation.

use super::{EstimationError, FittedModel};
use crate::core::{CovarianceType, NaAction, NaHandler, RegressionOptions};
use crate::panel::{
    numeric_values, parse_timestamp, post_indicator, require_columns, time_values,
    treatment_indicator, DesignMatrix, TreatmentValue,
};
use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use tracing::debug;

/// Name of the treated-group indicator regressor.
pub const TREATMENT: &str = "treatment";

/// Name of the post-cutoff indicator regressor.
pub const POST: &str = "post";

/// Name of the treatment × post interaction, the DiD effect.
pub const POST_TREAT: &str = "post_treat";

/// Difference-in-differences estimator.
///
/// Fits `outcome ~ const + treatment + post + post_treat [+ controls]`.
///
/// Every row holding a missing value in *any* column of the input table is
/// dropped before estimation, including columns the model never reads.
///
/// # Example
///
/// ```rust,ignore
/// use causal_tools::estimators::DidEstimator;
///
/// let model = DidEstimator::builder()
///     .outcome("price")
///     .treatment_column("category")
///     .time_column("start_time")
///     .treated_value("tertiary")
///     .cutoff("2022-08-23 22:00:00")
///     .build()?
///     .fit(&df)?;
///
/// println!("{}", model.coefficient("post_treat").unwrap().estimate);
/// ```
#[derive(Debug, Clone)]
pub struct DidEstimator {
    outcome: String,
    treatment_column: String,
    time_column: String,
    treated: TreatmentValue,
    cutoff: NaiveDateTime,
    controls: Vec<String>,
    covariance_type: CovarianceType,
    confidence_level: f64,
}

impl DidEstimator {
    pub fn builder() -> DidEstimatorBuilder {
        DidEstimatorBuilder::default()
    }

    /// Parsed cutoff; rows at or after it are in the post period.
    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    pub fn covariance_type(&self) -> CovarianceType {
        self.covariance_type
    }

    /// Estimate the model on `df`.
    ///
    /// # Errors
    ///
    /// - `PanelError::MissingColumn` for an unknown column name
    /// - `NaError::AllNa` when every row holds a missing value
    /// - `PanelError::NonNumeric` for a non-numeric outcome or control
    /// - `RegressionError` when the solver rejects the design
    pub fn fit(&self, df: &DataFrame) -> Result<FittedModel, EstimationError> {
        let mut used = vec![
            self.outcome.as_str(),
            self.treatment_column.as_str(),
            self.time_column.as_str(),
        ];
        used.extend(self.controls.iter().map(String::as_str));
        require_columns(df, &used[..])?;

        let (clean, na_info) = NaHandler::process(df, None, NaAction::Omit)?;
        debug!(
            dropped = na_info.n_removed,
            kept = na_info.n_clean,
            "dropped rows with missing values"
        );

        let times = time_values(&clean, &self.time_column)?;
        let post = post_indicator(&times, self.cutoff);
        let treatment = treatment_indicator(&clean, &self.treatment_column, &self.treated)?;
        let post_treat: Vec<f64> = treatment.iter().zip(&post).map(|(t, p)| t * p).collect();
        debug!(
            cutoff = %self.cutoff,
            n_post = post.iter().filter(|&&p| p > 0.0).count(),
            n_treated = treatment.iter().filter(|&&t| t > 0.0).count(),
            "built did indicators"
        );

        let mut design = DesignMatrix::new(clean.height());
        design.push(TREATMENT, treatment)?;
        design.push(POST, post)?;
        design.push(POST_TREAT, post_treat)?;
        for control in &self.controls {
            design.push(control.as_str(), numeric_values(&clean, control)?)?;
        }
        debug!(regressors = ?design.names(), "did design assembled");

        let y = numeric_values(&clean, &self.outcome)?;
        FittedModel::fit(&design, &y, self.covariance_type, self.confidence_level)
    }
}

/// Builder for [`DidEstimator`].
///
/// `outcome`, `treatment_column`, `time_column`, `treated_value` and `cutoff`
/// are required. HC3 standard errors are on by default.
#[derive(Debug, Clone)]
pub struct DidEstimatorBuilder {
    outcome: Option<String>,
    treatment_column: Option<String>,
    time_column: Option<String>,
    treated: Option<TreatmentValue>,
    cutoff: Option<String>,
    controls: Vec<String>,
    hc3_se: bool,
    confidence_level: f64,
}

impl Default for DidEstimatorBuilder {
    fn default() -> Self {
        Self {
            outcome: None,
            treatment_column: None,
            time_column: None,
            treated: None,
            cutoff: None,
            controls: Vec::new(),
            hc3_se: true,
            confidence_level: 0.95,
        }
    }
}

impl DidEstimatorBuilder {
    /// Outcome (dependent variable) column.
    pub fn outcome(mut self, name: impl Into<String>) -> Self {
        self.outcome = Some(name.into());
        self
    }

    /// Column holding the treatment-group assignment.
    pub fn treatment_column(mut self, name: impl Into<String>) -> Self {
        self.treatment_column = Some(name.into());
        self
    }

    /// Column holding the observation time.
    pub fn time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = Some(name.into());
        self
    }

    /// Value of the treatment column that marks treated rows.
    pub fn treated_value(mut self, value: impl Into<TreatmentValue>) -> Self {
        self.treated = Some(value.into());
        self
    }

    /// Start of the post period, e.g. `"2022-08-23 22:00:00"`.
    pub fn cutoff(mut self, cutoff: impl Into<String>) -> Self {
        self.cutoff = Some(cutoff.into());
        self
    }

    /// Numeric control columns, appended after the DiD regressors.
    pub fn controls<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controls = names.into_iter().map(Into::into).collect();
        self
    }

    /// HC3 (true, default) or classical (false) standard errors.
    pub fn hc3_se(mut self, hc3: bool) -> Self {
        self.hc3_se = hc3;
        self
    }

    /// Confidence level for the reported intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Validate settings and parse the cutoff.
    pub fn build(self) -> Result<DidEstimator, EstimationError> {
        let covariance_type = CovarianceType::from_hc3_flag(self.hc3_se);
        RegressionOptions::builder()
            .covariance_type(covariance_type)
            .confidence_level(self.confidence_level)
            .build()?;

        let raw_cutoff = self.cutoff.ok_or(EstimationError::MissingField("cutoff"))?;

        Ok(DidEstimator {
            outcome: self.outcome.ok_or(EstimationError::MissingField("outcome"))?,
            treatment_column: self
                .treatment_column
                .ok_or(EstimationError::MissingField("treatment_column"))?,
            time_column: self
                .time_column
                .ok_or(EstimationError::MissingField("time_column"))?,
            treated: self
                .treated
                .ok_or(EstimationError::MissingField("treated_value"))?,
            cutoff: parse_timestamp(&raw_cutoff)?,
            controls: self.controls,
            covariance_type,
            confidence_level: self.confidence_level,
        })
    }
}
