//! Matrix utility functions.

use faer::linalg::solvers::DenseSolveCore;
use faer::{Col, Mat};

/// Flag columns whose spread is negligible against their magnitude.
///
/// A column is constant when `max - min <= tolerance * max|x|`, so the test
/// does not depend on the units of the column. All-zero columns are constant.
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    if x.nrows() == 0 {
        return vec![true; x.ncols()];
    }

    (0..x.ncols())
        .map(|j| {
            let column = x.col(j);
            let (min, max, magnitude) = column.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
                |(lo, hi, mag), &v| (lo.min(v), hi.max(v), mag.max(v.abs())),
            );
            max - min <= tolerance * magnitude
        })
        .collect()
}

/// Center a matrix by subtracting column means.
pub fn center_columns(x: &Mat<f64>) -> (Mat<f64>, Col<f64>) {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let mut means = Col::zeros(n_cols);
    let mut centered = Mat::zeros(n_rows, n_cols);

    for j in 0..n_cols {
        let sum: f64 = (0..n_rows).map(|i| x[(i, j)]).sum();
        means[j] = sum / n_rows as f64;

        for i in 0..n_rows {
            centered[(i, j)] = x[(i, j)] - means[j];
        }
    }

    (centered, means)
}

/// Center a vector by subtracting the mean.
pub fn center_vector(y: &Col<f64>) -> (Col<f64>, f64) {
    let n = y.nrows();
    let mean: f64 = y.iter().sum::<f64>() / n as f64;

    let centered = Col::from_fn(n, |i| y[i] - mean);

    (centered, mean)
}

/// Build the design matrix actually used for estimation: an optional leading
/// column of ones followed by the non-aliased columns of `x`.
///
/// Returns the matrix and, for each of its columns, the position of that
/// parameter in the full parameter vector (intercept at 0 when present).
pub fn reduced_design(x: &Mat<f64>, aliased: &[bool], with_intercept: bool) -> (Mat<f64>, Vec<usize>) {
    let offset = usize::from(with_intercept);
    let mut positions = Vec::with_capacity(x.ncols() + offset);
    if with_intercept {
        positions.push(0);
    }
    positions.extend(
        aliased
            .iter()
            .enumerate()
            .filter(|(_, &is_aliased)| !is_aliased)
            .map(|(j, _)| j + offset),
    );

    let design = Mat::from_fn(x.nrows(), positions.len(), |i, j| {
        let pos = positions[j];
        if with_intercept && pos == 0 {
            1.0
        } else {
            x[(i, pos - offset)]
        }
    });

    (design, positions)
}

/// Invert a square matrix through its QR decomposition.
///
/// Returns `None` when a diagonal entry of R falls below `1e-10` relative to
/// the largest one.
pub fn invert_via_qr(m: &Mat<f64>) -> Option<Mat<f64>> {
    let qr = m.qr();
    let r = qr.R();

    let scale = (0..m.nrows()).map(|i| r[(i, i)].abs()).fold(1.0_f64, f64::max);
    if (0..m.nrows()).any(|i| r[(i, i)].abs() < 1e-10 * scale) {
        return None;
    }

    Some(qr.inverse())
}
