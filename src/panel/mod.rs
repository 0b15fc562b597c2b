//! Panel-data plumbing between a `polars::DataFrame` and the OLS solver.
//!
//! - **Columns**: numeric extraction and treated-group matching
//! - **Time**: timestamp parsing and the pre/post split
//! - **Quarters**: quarter buckets and their regressor names
//! - **Design**: named, ordered regressor matrices

mod columns;
mod design;
mod quarter;
mod time;

pub use columns::{numeric_values, require_columns, treatment_indicator, TreatmentValue};
pub use design::{DesignMatrix, INTERCEPT_NAME};
pub use quarter::{QuarterColumns, QuarterLabel, DUMMY_PREFIX, INTERACTION_PREFIX};
pub use time::{parse_timestamp, post_indicator, time_values};

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while turning a table into regressors.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NonNumeric { column: String, dtype: String },

    #[error("column '{column}' has unsupported time dtype {dtype}")]
    UnsupportedTimeType { column: String, dtype: String },

    #[error("cannot interpret '{0}' as a timestamp")]
    InvalidTimestamp(String),

    #[error("invalid quarter label '{0}': expected <year><quarter>, e.g. 20223")]
    InvalidQuarterLabel(String),

    #[error("baseline quarter {baseline} not observed (observed: {observed})")]
    BaselineNotObserved { baseline: String, observed: String },

    #[error("missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("regressor '{0}' appears more than once")]
    DuplicateRegressor(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
