//! Panel-data estimators built on the OLS solver.
//!
//! - [`DidEstimator`]: two-period difference-in-differences
//! - [`EventStudyEstimator`]: quarterly event study around a baseline quarter

mod did;
mod event_study;
mod model;

pub use did::{DidEstimator, DidEstimatorBuilder, POST, POST_TREAT, TREATMENT};
pub use event_study::{EventStudyEstimator, EventStudyEstimatorBuilder, EventStudyFit};
pub use model::{Coefficient, FittedModel};

use crate::core::{NaError, OptionsError};
use crate::panel::PanelError;
use crate::solvers::RegressionError;
use thiserror::Error;

/// Errors raised by the estimators.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("missing required setting '{0}'")]
    MissingField(&'static str),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error(transparent)]
    MissingValues(#[from] NaError),

    #[error(transparent)]
    Regression(#[from] RegressionError),
}
