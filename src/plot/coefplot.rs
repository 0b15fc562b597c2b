//! Coefficient plots: point estimates with confidence whiskers.

use super::canvas::{Canvas, Color, LineStyle, Style, TextAnchor, TextStyle};
use super::PlotError;
use crate::estimators::FittedModel;
use crate::panel::INTERCEPT_NAME;
use serde::Serialize;
use tracing::debug;

const FIGURE_WIDTH: f64 = 800.0;
const FIGURE_HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 70.0;

/// Which coefficients to plot, by name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrefixFilter {
    /// Every non-intercept coefficient.
    #[default]
    All,
    /// Coefficients whose name starts with any of the prefixes.
    Any(Vec<String>),
}

impl PrefixFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            PrefixFilter::All => true,
            PrefixFilter::Any(prefixes) => prefixes.iter().any(|p| name.starts_with(p.as_str())),
        }
    }
}

impl From<&str> for PrefixFilter {
    fn from(prefix: &str) -> Self {
        PrefixFilter::Any(vec![prefix.to_string()])
    }
}

impl From<String> for PrefixFilter {
    fn from(prefix: String) -> Self {
        PrefixFilter::Any(vec![prefix])
    }
}

impl From<Vec<&str>> for PrefixFilter {
    fn from(prefixes: Vec<&str>) -> Self {
        PrefixFilter::Any(prefixes.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for PrefixFilter {
    fn from(prefixes: Vec<String>) -> Self {
        PrefixFilter::Any(prefixes)
    }
}

impl<const N: usize> From<[&str; N]> for PrefixFilter {
    fn from(prefixes: [&str; N]) -> Self {
        PrefixFilter::Any(prefixes.iter().map(ToString::to_string).collect())
    }
}

/// One plotted coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartCategory {
    pub name: String,
    pub tick_label: String,
    pub estimate: f64,
    /// `estimate - lower confidence bound`; the whisker extends this far both ways.
    pub half_width: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Style of the horizontal reference line at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub dashed: bool,
    pub width: f64,
}

/// Marker drawn at each point estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub shape: &'static str,
    pub size: f64,
}

/// A complete, renderer-independent description of a coefficient plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientChart {
    pub width: f64,
    pub height: f64,
    pub x_label: String,
    pub y_label: String,
    pub confidence_level: f64,
    pub categories: Vec<ChartCategory>,
    pub zero_line: ReferenceLine,
    pub marker: Marker,
}

impl CoefficientChart {
    /// Names of the plotted coefficients, in plot order.
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Pretty-printed JSON description (NaN estimates become `null`).
    pub fn to_json(&self) -> Result<String, PlotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as an SVG document.
    ///
    /// Categories with a NaN estimate (aliased regressors) keep their tick
    /// label but draw no bar, whisker or marker.
    pub fn to_svg(&self) -> Result<String, PlotError> {
        let mut canvas = Canvas::new(self.width, self.height);
        let left = MARGIN_LEFT;
        let top = MARGIN_TOP;
        let plot_w = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = self.height - MARGIN_TOP - MARGIN_BOTTOM;
        let bottom = top + plot_h;

        let (y_min, y_max) = self.value_range();
        let to_px = |v: f64| bottom - (v - y_min) / (y_max - y_min) * plot_h;

        let tick_style = TextStyle {
            size: 12.0,
            anchor: TextAnchor::End,
            ..Default::default()
        };
        let grid = LineStyle::solid(Color::GREY, 0.5);
        for tick in axis_ticks(y_min, y_max) {
            let y = to_px(tick);
            canvas.line(left - 5.0, y, left, y, &grid);
            canvas.text(left - 8.0, y + 4.0, &format_tick(tick), &tick_style);
        }

        let n = self.categories.len().max(1) as f64;
        let slot = plot_w / n;
        let bar_w = slot * 0.5;
        let black = LineStyle::solid(Color::BLACK, 1.5);
        let label_style = TextStyle {
            size: 16.0,
            anchor: TextAnchor::Middle,
            ..Default::default()
        };

        for (i, category) in self.categories.iter().enumerate() {
            let x = left + (i as f64 + 0.5) * slot;
            canvas.text(x, bottom + 22.0, &category.tick_label, &label_style);

            if !category.estimate.is_finite() {
                continue;
            }
            let y_est = to_px(category.estimate);
            let y_zero = to_px(0.0);
            canvas.rect(
                x - bar_w / 2.0,
                y_est.min(y_zero),
                bar_w,
                (y_est - y_zero).abs(),
                &Style::outlined(Color::GREY, 0.8),
            );
            if category.half_width.is_finite() {
                canvas.error_bar(x, to_px(category.lower), to_px(category.upper), bar_w * 0.3, &black);
            }
            canvas.square_marker(x, y_est, self.marker.size.sqrt(), Color::BLACK);
        }

        let zero = to_px(self.zero_line.y);
        let zero_style = if self.zero_line.dashed {
            LineStyle::dashed(Color::BLACK, self.zero_line.width)
        } else {
            LineStyle::solid(Color::BLACK, self.zero_line.width)
        };
        canvas.line(left, zero, left + plot_w, zero, &zero_style);

        canvas.line(left, top, left, bottom, &black);
        canvas.line(left, bottom, left + plot_w, bottom, &black);

        let axis_label = TextStyle {
            size: 14.0,
            anchor: TextAnchor::Middle,
            ..Default::default()
        };
        if !self.x_label.is_empty() {
            canvas.text(left + plot_w / 2.0, self.height - 15.0, &self.x_label, &axis_label);
        }
        if !self.y_label.is_empty() {
            canvas.text_rotated(20.0, top + plot_h / 2.0, &self.y_label, &axis_label, -90.0);
        }

        Ok(canvas.finish_svg()?)
    }

    /// Padded y range covering every whisker and zero.
    fn value_range(&self) -> (f64, f64) {
        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for c in &self.categories {
            for v in [c.lower, c.upper, c.estimate] {
                if v.is_finite() {
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
            }
        }
        if hi - lo < f64::EPSILON {
            return (-1.0, 1.0);
        }
        let pad = (hi - lo) * 0.1;
        (lo - pad, hi + pad)
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn axis_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let step = nice_step((hi - lo) / 5.0);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn format_tick(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Builds [`CoefficientChart`]s from fitted models.
///
/// # Example
///
/// ```rust,ignore
/// use causal_tools::plot::CoefPlot;
///
/// let chart = CoefPlot::builder()
///     .prefix("inter")
///     .tick_labels(study.tick_labels())
///     .y_label("price CHF")
///     .build()
///     .chart(&study.model)?;
/// std::fs::write("event_study.svg", chart.to_svg()?)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoefPlot {
    x_label: String,
    y_label: String,
    tick_labels: Option<Vec<String>>,
    prefix: PrefixFilter,
}

impl CoefPlot {
    pub fn builder() -> CoefPlotBuilder {
        CoefPlotBuilder::default()
    }

    /// Select coefficients from `model` and lay them out as a chart.
    ///
    /// # Errors
    ///
    /// - `PlotError::TickLabelMismatch` if tick labels were supplied and their
    ///   count differs from the number of selected coefficients
    pub fn chart(&self, model: &FittedModel) -> Result<CoefficientChart, PlotError> {
        let selected: Vec<_> = model
            .coefficients()
            .into_iter()
            .filter(|c| c.name != INTERCEPT_NAME)
            .filter(|c| self.prefix.matches(&c.name))
            .collect();

        if let Some(labels) = &self.tick_labels {
            if labels.len() != selected.len() {
                return Err(PlotError::TickLabelMismatch {
                    expected: selected.len(),
                    got: labels.len(),
                });
            }
        }

        let categories: Vec<ChartCategory> = selected
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let half_width = c.estimate - c.conf_low;
                let tick_label = self
                    .tick_labels
                    .as_ref()
                    .map_or_else(|| c.name.clone(), |labels| labels[i].clone());
                ChartCategory {
                    tick_label,
                    estimate: c.estimate,
                    half_width,
                    lower: c.estimate - half_width,
                    upper: c.estimate + half_width,
                    name: c.name,
                }
            })
            .collect();
        debug!(n_categories = categories.len(), "coefficient chart assembled");

        Ok(CoefficientChart {
            width: FIGURE_WIDTH,
            height: FIGURE_HEIGHT,
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            confidence_level: model.confidence_level(),
            categories,
            zero_line: ReferenceLine {
                y: 0.0,
                dashed: true,
                width: 4.0,
            },
            marker: Marker {
                shape: "square",
                size: 120.0,
            },
        })
    }
}

/// Builder for [`CoefPlot`].
#[derive(Debug, Clone, Default)]
pub struct CoefPlotBuilder {
    plot: CoefPlot,
}

impl CoefPlotBuilder {
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.plot.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.plot.y_label = label.into();
        self
    }

    /// Positional labels replacing the coefficient names on the x axis.
    pub fn tick_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plot.tick_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the plot to coefficients starting with a prefix (or any of several).
    pub fn prefix(mut self, prefix: impl Into<PrefixFilter>) -> Self {
        self.plot.prefix = prefix.into();
        self
    }

    pub fn build(self) -> CoefPlot {
        self.plot
    }
}
