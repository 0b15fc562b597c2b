//! Causal-inference helpers for panel data.
//!
//! The crate estimates two-period difference-in-differences models and
//! quarterly event studies on a `polars` [`DataFrame`](polars::prelude::DataFrame),
//! and turns the fitted models into coefficient plots. Estimation runs on an
//! in-crate OLS solver with classical or heteroskedasticity-consistent (HC0-HC3)
//! standard errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use causal_tools::prelude::*;
//!
//! let study = EventStudyEstimator::builder()
//!     .outcome("price")
//!     .treatment_column("category")
//!     .time_column("start_time")
//!     .treated_value("tertiary")
//!     .baseline("20222")
//!     .build()?
//!     .fit(&df)?;
//!
//! let chart = CoefPlot::builder()
//!     .prefix("inter")
//!     .tick_labels(study.tick_labels())
//!     .build()
//!     .chart(&study.model)?;
//!
//! println!("{}", study.model);
//! std::fs::write("event_study.svg", chart.to_svg()?)?;
//! ```

pub mod core;
pub mod diagnostics;
pub mod estimators;
pub mod inference;
pub mod panel;
pub mod plot;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{CovarianceType, NaAction, RegressionOptions, RegressionResult};
    pub use crate::diagnostics::{compute_leverage, studentized_residuals};
    pub use crate::estimators::{
        Coefficient, DidEstimator, EstimationError, EventStudyEstimator, EventStudyFit,
        FittedModel,
    };
    pub use crate::panel::{QuarterLabel, TreatmentValue};
    pub use crate::plot::{CoefPlot, CoefficientChart, PlotError, PrefixFilter};
    pub use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
}

pub use crate::estimators::{DidEstimator, EstimationError, EventStudyEstimator, FittedModel};
pub use crate::plot::{CoefPlot, CoefficientChart};
