//! Coefficient plots.
//!
//! [`CoefPlot`] turns a fitted model into a [`CoefficientChart`], a plain
//! value that serializes to JSON or renders to SVG. No drawing state is
//! shared between calls.

mod canvas;
mod coefplot;

pub use coefplot::{
    ChartCategory, CoefPlot, CoefPlotBuilder, CoefficientChart, Marker, PrefixFilter,
    ReferenceLine,
};

use thiserror::Error;

/// Errors raised while building or rendering a chart.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("{got} tick labels supplied for {expected} selected coefficients")]
    TickLabelMismatch { expected: usize, got: usize },

    #[error("chart serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("svg rendering failed")]
    Render(#[from] std::fmt::Error),
}
