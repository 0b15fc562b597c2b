//! Solver traits and errors.

use crate::core::RegressionResult;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors raised by the solver before any coefficient is estimated.
///
/// Rank deficiency is not an error: aliased columns come back as NaN.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),
}

/// A configured estimator.
pub trait Regressor {
    type Fitted: FittedRegressor;

    /// Fit on `x` (one column per regressor, no intercept column) and `y`.
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted estimator.
pub trait FittedRegressor {
    fn result(&self) -> &RegressionResult;

    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    fn intercept(&self) -> f64 {
        self.result().intercept
    }

    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }
}
