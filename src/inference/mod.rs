//! Statistical inference (covariance, standard errors, p-values, confidence intervals).

mod coefficient;
mod covariance;

pub use coefficient::{CoefficientInference, TestDistribution};
pub use covariance::ParameterCovariance;
