//! Core types for regression analysis.

mod na_action;
mod options;
mod result;

pub use na_action::{NaAction, NaError, NaHandler, NaInfo};
pub use options::{CovarianceType, OptionsError, RegressionOptions, RegressionOptionsBuilder};
pub use result::RegressionResult;
