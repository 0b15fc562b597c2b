//! Residuals scaled by the estimated error standard deviation.
//!
//! All three scalings return NaN where the residual variance is zero or not
//! finite, except that an exactly zero residual standardizes to zero.

use faer::Col;

/// Floor on `1 - h` so that points with leverage one do not divide by zero.
const MIN_ONE_MINUS_H: f64 = 1e-14;

fn usable(mse: f64) -> bool {
    mse > 0.0 && mse.is_finite()
}

/// `e_i / s` with `s = sqrt(mse)`.
pub fn standardized_residuals(residuals: &Col<f64>, mse: f64) -> Col<f64> {
    if !usable(mse) {
        return Col::from_fn(residuals.nrows(), |i| {
            if residuals[i].abs() < 1e-14 {
                0.0
            } else {
                f64::NAN
            }
        });
    }

    let s = mse.sqrt();
    Col::from_fn(residuals.nrows(), |i| residuals[i] / s)
}

/// Internally studentized residuals `e_i / (s sqrt(1 - h_i))`.
pub fn studentized_residuals(residuals: &Col<f64>, leverage: &Col<f64>, mse: f64) -> Col<f64> {
    let n = residuals.nrows();
    if !usable(mse) {
        return Col::from_fn(n, |_| f64::NAN);
    }

    let s = mse.sqrt();
    Col::from_fn(n, |i| {
        residuals[i] / (s * (1.0 - leverage[i]).max(MIN_ONE_MINUS_H).sqrt())
    })
}

/// Externally studentized (deleted) residuals `e_i / (s_(i) sqrt(1 - h_i))`.
///
/// `s_(i)` is the residual standard error with row `i` left out, obtained
/// without refitting from `RSS_(i) = RSS - e_i² / (1 - h_i)` on `n - p - 1`
/// degrees of freedom.
pub fn externally_studentized_residuals(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    mse: f64,
    n_params: usize,
) -> Col<f64> {
    let n = residuals.nrows();
    let df_resid = n.saturating_sub(n_params);
    if df_resid <= 1 || !usable(mse) {
        return Col::from_fn(n, |_| f64::NAN);
    }

    let rss = mse * df_resid as f64;
    let df_loo = (df_resid - 1) as f64;

    Col::from_fn(n, |i| {
        let e = residuals[i];
        let one_minus_h = (1.0 - leverage[i]).max(MIN_ONE_MINUS_H);
        let mse_loo = (rss - e * e / one_minus_h) / df_loo;
        if mse_loo > 0.0 {
            e / (mse_loo * one_minus_h).sqrt()
        } else {
            f64::NAN
        }
    })
}
