//! Regression diagnostics (leverage and scaled residuals).
//!
//! - **Leverage**: hat-matrix diagonal, also the weight source for the
//!   HC2/HC3 sandwich estimators
//! - **Residuals**: standardized and studentized residuals for outlier detection
//!
//! # Example
//!
//! ```rust,ignore
//! use causal_tools::diagnostics::{compute_leverage_with_aliased, studentized_residuals};
//!
//! let leverage = compute_leverage_with_aliased(&x, &result.aliased, true);
//! let studentized = studentized_residuals(&result.residuals, &leverage, result.mse);
//! ```

mod leverage;
mod residuals;

pub(crate) use leverage::hat_diagonal;
pub use leverage::{compute_leverage, compute_leverage_with_aliased};
pub use residuals::{
    externally_studentized_residuals, standardized_residuals, studentized_residuals,
};
