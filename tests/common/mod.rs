//! Common test utilities and data generators.
#![allow(dead_code)]

use causal_tools::panel::parse_timestamp;
use faer::{Col, Mat};
use polars::prelude::*;

/// Deterministic uniform draws on [-1, 1].
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
    }
}

/// Generate simple linear data: y = x * beta + intercept + noise
pub fn generate_linear_data(
    n_samples: usize,
    n_features: usize,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, Col<f64>) {
    let mut rng = Lcg::new(seed);

    let mut x = Mat::zeros(n_samples, n_features);
    let mut y = Col::zeros(n_samples);
    let true_coefficients = Col::from_fn(n_features, |j| (j + 1) as f64);

    for i in 0..n_samples {
        let mut yi = intercept;
        for j in 0..n_features {
            x[(i, j)] = rng.uniform();
            yi += x[(i, j)] * true_coefficients[j];
        }
        yi += noise_std * rng.uniform();
        y[i] = yi;
    }

    (x, y, true_coefficients)
}

/// Generate data with collinear features.
pub fn generate_collinear_data(n_samples: usize) -> (Mat<f64>, Col<f64>) {
    let mut x = Mat::zeros(n_samples, 3);
    let mut y = Col::zeros(n_samples);

    for i in 0..n_samples {
        x[(i, 0)] = i as f64;
        x[(i, 1)] = 2.0 * i as f64; // Perfectly collinear with x0
        x[(i, 2)] = (i * i) as f64;
        y[i] = 1.0 + 2.0 * x[(i, 0)] + 3.0 * x[(i, 2)];
    }

    (x, y)
}

/// Generate data with constant columns.
pub fn generate_constant_column_data(n_samples: usize) -> (Mat<f64>, Col<f64>) {
    let mut x = Mat::zeros(n_samples, 3);
    let mut y = Col::zeros(n_samples);

    for i in 0..n_samples {
        x[(i, 0)] = i as f64;
        x[(i, 1)] = 5.0; // Constant column
        x[(i, 2)] = (i * 2) as f64;
        y[i] = 1.0 + 2.0 * x[(i, 0)] + 3.0 * x[(i, 2)];
    }

    (x, y)
}

/// Invert a small dense matrix by Gauss-Jordan elimination with partial pivoting.
pub fn gauss_jordan_inverse(a: &Mat<f64>) -> Mat<f64> {
    let n = a.nrows();
    let mut m = a.clone();
    let mut inv = Mat::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 });

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r1, &r2| m[(r1, col)].abs().total_cmp(&m[(r2, col)].abs()))
            .unwrap();
        for j in 0..n {
            let (a1, a2) = (m[(col, j)], m[(pivot, j)]);
            m[(col, j)] = a2;
            m[(pivot, j)] = a1;
            let (b1, b2) = (inv[(col, j)], inv[(pivot, j)]);
            inv[(col, j)] = b2;
            inv[(pivot, j)] = b1;
        }

        let diag = m[(col, col)];
        for j in 0..n {
            m[(col, j)] /= diag;
            inv[(col, j)] /= diag;
        }
        for r in 0..n {
            if r != col {
                let factor = m[(r, col)];
                for j in 0..n {
                    m[(r, j)] -= factor * m[(col, j)];
                    inv[(r, j)] -= factor * inv[(col, j)];
                }
            }
        }
    }

    inv
}

/// Prepend a column of ones to `x`.
pub fn with_intercept(x: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            x[(i, j - 1)]
        }
    })
}

// ============================================================================
// Panel generators
// ============================================================================

/// Observation times before the 2022-08-23 22:00:00 cutoff.
pub const PRE_TIMES: [&str; 2] = ["2022-03-15 10:00:00", "2022-06-01 08:30:00"];

/// Observation times at or after the cutoff.
pub const POST_TIMES: [&str; 2] = ["2022-09-01 00:00:00", "2022-11-15 12:00:00"];

/// Cutoff matching `PRE_TIMES` / `POST_TIMES`.
pub const CUTOFF: &str = "2022-08-23 22:00:00";

/// Settings for [`did_panel`].
pub struct DidPanel {
    /// Control-group rows per period.
    pub n_control: usize,
    /// Treated-group rows per period.
    pub n_treated: usize,
    /// True treatment effect on `price`.
    pub effect: f64,
    /// Half-width of the uniform noise.
    pub noise: f64,
    /// Multiplier on the noise in the treated post-period cell.
    pub treated_post_noise: f64,
    pub seed: u64,
}

impl Default for DidPanel {
    fn default() -> Self {
        Self {
            n_control: 400,
            n_treated: 100,
            effect: 1.5,
            noise: 0.5,
            treated_post_noise: 1.0,
            seed: 42,
        }
    }
}

/// Two-group, two-period panel:
/// `price = 10 + 2 treat + 1.5 post + effect treat·post + 0.3 size + noise`.
///
/// Columns: `price` (f64), `category` ("tertiary" for treated, "primary"
/// otherwise), `start_time` (string timestamps) and `size` (f64 control).
pub fn did_panel(settings: &DidPanel) -> DataFrame {
    let mut rng = Lcg::new(settings.seed);
    let mut price = Vec::new();
    let mut category = Vec::new();
    let mut start_time = Vec::new();
    let mut size = Vec::new();

    for (post, times) in [(0.0, PRE_TIMES), (1.0, POST_TIMES)] {
        for (treat, n) in [(0.0, settings.n_control), (1.0, settings.n_treated)] {
            for i in 0..n {
                let s = 5.0 + 2.0 * rng.uniform();
                let scale = if treat * post > 0.0 {
                    settings.noise * settings.treated_post_noise
                } else {
                    settings.noise
                };
                price.push(
                    10.0 + 2.0 * treat
                        + 1.5 * post
                        + settings.effect * treat * post
                        + 0.3 * s
                        + scale * rng.uniform(),
                );
                category.push(if treat > 0.0 { "tertiary" } else { "primary" });
                start_time.push(times[i % times.len()]);
                size.push(s);
            }
        }
    }

    DataFrame::new(vec![
        Column::new("price".into(), price),
        Column::new("category".into(), category),
        Column::new("start_time".into(), start_time),
        Column::new("size".into(), size),
    ])
    .unwrap()
}

/// Quarters of the event-study panel: (timestamp, label, period effect, treatment effect).
pub const QUARTERS: [(&str, &str, f64, f64); 5] = [
    ("2021-11-15 09:00:00", "20214", 0.2, -0.1),
    ("2022-02-10 12:00:00", "20221", 0.4, 0.0),
    ("2022-05-20 18:00:00", "20222", 0.0, 0.0),
    ("2022-08-05 07:45:00", "20223", 0.6, 1.5),
    ("2022-12-01 23:59:59", "20224", 0.8, 2.0),
];

/// Row order over `QUARTERS`; first occurrences are 20222, 20214, 20224, 20221, 20223.
const QUARTER_CYCLE: [usize; 5] = [2, 0, 4, 1, 3];

/// Quarterly panel with `n_cycles` rows per quarter and group.
///
/// `price = 5 + treated + period effect + treated · treatment effect + noise`.
/// `group` is an integer column with 1 for treated units, `start_time` is a
/// millisecond `Datetime` column, `size` an unrelated numeric control.
pub fn event_study_panel(n_cycles: usize, noise: f64, seed: u64) -> DataFrame {
    let mut rng = Lcg::new(seed);
    let mut price = Vec::new();
    let mut group = Vec::new();
    let mut millis = Vec::new();
    let mut size = Vec::new();

    for _ in 0..n_cycles {
        for treat in [0_i64, 1] {
            for &q in &QUARTER_CYCLE {
                let (raw, _, period, effect) = QUARTERS[q];
                let t = treat as f64;
                price.push(5.0 + t + period + t * effect + noise * rng.uniform());
                group.push(treat);
                millis.push(parse_timestamp(raw).unwrap().and_utc().timestamp_millis());
                size.push(1.0 + rng.uniform());
            }
        }
    }

    let start_time = Series::new("start_time".into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap();

    DataFrame::new(vec![
        Column::new("price".into(), price),
        Column::new("group".into(), group),
        Column::from(start_time),
        Column::new("size".into(), size),
    ])
    .unwrap()
}

/// Approximate equality check for floating point values.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
