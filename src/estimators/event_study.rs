//! Quarterly event-study estimation.

use super::did::TREATMENT;
use super::{EstimationError, FittedModel};
use crate::core::{CovarianceType, NaAction, NaHandler, RegressionOptions};
use crate::panel::{
    numeric_values, require_columns, time_values, treatment_indicator, DesignMatrix, PanelError,
    QuarterColumns, QuarterLabel, TreatmentValue,
};
use polars::prelude::DataFrame;
use tracing::debug;

/// Quarterly event-study estimator.
///
/// Fits
/// `outcome ~ const [+ controls] + treatment + Σ quarter_<q> + Σ inter_<q>`
/// where `q` ranges over every observed quarter except the baseline. Dummies
/// appear in chronological order, interactions in first-occurrence order.
///
/// Unlike [`DidEstimator`](super::DidEstimator), missing values are not
/// dropped: a missing value in any column the model reads is an error.
#[derive(Debug, Clone)]
pub struct EventStudyEstimator {
    outcome: String,
    treatment_column: String,
    time_column: String,
    treated: TreatmentValue,
    baseline: QuarterLabel,
    controls: Vec<String>,
    covariance_type: CovarianceType,
    confidence_level: f64,
}

/// Output of [`EventStudyEstimator::fit`].
#[derive(Debug, Clone)]
pub struct EventStudyFit {
    /// The fitted regression.
    pub model: FittedModel,
    /// Distinct quarters in the order they first appear in the input rows.
    pub quarters: Vec<QuarterLabel>,
    /// The omitted reference quarter.
    pub baseline: QuarterLabel,
}

impl EventStudyFit {
    /// The most recently observed quarter, i.e. the last entry of `quarters`.
    pub fn last_quarter(&self) -> Option<QuarterLabel> {
        self.quarters.last().copied()
    }

    /// Quarters that carry an interaction coefficient, in model order.
    pub fn estimated_quarters(&self) -> Vec<QuarterLabel> {
        self.quarters
            .iter()
            .copied()
            .filter(|q| *q != self.baseline)
            .collect()
    }

    /// Tick labels matching the interaction coefficients, for plotting.
    pub fn tick_labels(&self) -> Vec<String> {
        self.estimated_quarters()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl EventStudyEstimator {
    pub fn builder() -> EventStudyEstimatorBuilder {
        EventStudyEstimatorBuilder::default()
    }

    pub fn baseline(&self) -> QuarterLabel {
        self.baseline
    }

    pub fn covariance_type(&self) -> CovarianceType {
        self.covariance_type
    }

    /// Estimate the model on `df`.
    ///
    /// # Errors
    ///
    /// - `PanelError::MissingColumn` for an unknown column name
    /// - `NaError::NaValuesPresent` for a missing value in a used column
    /// - `PanelError::BaselineNotObserved` when no row falls in the baseline quarter
    /// - `RegressionError` when the solver rejects the design
    pub fn fit(&self, df: &DataFrame) -> Result<EventStudyFit, EstimationError> {
        let mut used = vec![
            self.outcome.clone(),
            self.treatment_column.clone(),
            self.time_column.clone(),
        ];
        used.extend(self.controls.iter().cloned());
        require_columns(df, &used[..])?;
        NaHandler::process(df, Some(&used[..]), NaAction::Fail)?;

        let times = time_values(df, &self.time_column)?;
        let labels: Vec<QuarterLabel> = times.iter().map(QuarterLabel::from_timestamp).collect();
        let columns = QuarterColumns::from_observed(&labels);
        let quarters = columns.labels();
        debug!(
            quarters = ?quarters.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "observed quarters"
        );

        if !columns.contains(self.baseline) {
            return Err(PanelError::BaselineNotObserved {
                baseline: self.baseline.to_string(),
                observed: quarters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into());
        }

        let treatment = treatment_indicator(df, &self.treatment_column, &self.treated)?;
        let dummy_of = |quarter: QuarterLabel| -> Vec<f64> {
            labels
                .iter()
                .map(|l| if *l == quarter { 1.0 } else { 0.0 })
                .collect()
        };

        let mut design = DesignMatrix::new(df.height());
        for control in &self.controls {
            design.push(control.as_str(), numeric_values(df, control)?)?;
        }
        design.push(TREATMENT, treatment.clone())?;

        for quarter in columns.sorted_labels() {
            if quarter == self.baseline {
                continue;
            }
            if let Some(name) = columns.dummy(quarter) {
                design.push(name, dummy_of(quarter))?;
            }
        }
        for &quarter in &quarters {
            if quarter == self.baseline {
                continue;
            }
            if let Some(name) = columns.interaction(quarter) {
                let interaction = dummy_of(quarter)
                    .iter()
                    .zip(&treatment)
                    .map(|(d, t)| d * t)
                    .collect();
                design.push(name, interaction)?;
            }
        }
        debug!(regressors = ?design.names(), "event-study design assembled");

        let y = numeric_values(df, &self.outcome)?;
        let model = FittedModel::fit(&design, &y, self.covariance_type, self.confidence_level)?;

        Ok(EventStudyFit {
            model,
            quarters,
            baseline: self.baseline,
        })
    }
}

/// Builder for [`EventStudyEstimator`].
///
/// `outcome`, `treatment_column`, `time_column`, `treated_value` and
/// `baseline` are required. HC3 standard errors are on by default.
#[derive(Debug, Clone)]
pub struct EventStudyEstimatorBuilder {
    outcome: Option<String>,
    treatment_column: Option<String>,
    time_column: Option<String>,
    treated: Option<TreatmentValue>,
    baseline: Option<String>,
    controls: Vec<String>,
    hc3_se: bool,
    confidence_level: f64,
}

impl Default for EventStudyEstimatorBuilder {
    fn default() -> Self {
        Self {
            outcome: None,
            treatment_column: None,
            time_column: None,
            treated: None,
            baseline: None,
            controls: Vec::new(),
            hc3_se: true,
            confidence_level: 0.95,
        }
    }
}

impl EventStudyEstimatorBuilder {
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

    /// Reference quarter, e.g. `"20222"`.
    pub fn baseline(mut self, label: impl Into<String>) -> Self {
        self.baseline = Some(label.into());
        self
    }

    /// Numeric control columns, placed ahead of the event-study regressors.
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

    /// Validate settings and parse the baseline label.
    pub fn build(self) -> Result<EventStudyEstimator, EstimationError> {
        let covariance_type = CovarianceType::from_hc3_flag(self.hc3_se);
        RegressionOptions::builder()
            .covariance_type(covariance_type)
            .confidence_level(self.confidence_level)
            .build()?;

        let baseline: QuarterLabel = self
            .baseline
            .ok_or(EstimationError::MissingField("baseline"))?
            .parse()?;

        Ok(EventStudyEstimator {
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
            baseline,
            controls: self.controls,
            covariance_type,
            confidence_level: self.confidence_level,
        })
    }
}
