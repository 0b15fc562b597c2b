//! Leverage (hat matrix diagonal) calculations.

use crate::utils::{invert_via_qr, reduced_design};
use faer::{Col, Mat};

/// Diagonal of the hat matrix `X (X'X)⁻¹ X'` for an already assembled design.
pub(crate) fn hat_diagonal(design: &Mat<f64>, xtx_inv: &Mat<f64>) -> Col<f64> {
    let projected = design * xtx_inv;
    Col::from_fn(design.nrows(), |i| {
        let h_ii: f64 = (0..design.ncols())
            .map(|j| projected[(i, j)] * design[(i, j)])
            .sum();
        h_ii.clamp(0.0, 1.0)
    })
}

/// Compute leverage values (diagonal of hat matrix H = X(X'X)^(-1)X').
///
/// Leverage measures the influence of each observation on its own fitted value.
///
/// # Properties
/// - h_ii ∈ [0, 1]
/// - Σ h_ii = p (number of parameters)
///
/// Returns NaN for every observation when X'X is singular.
pub fn compute_leverage(x: &Mat<f64>, with_intercept: bool) -> Col<f64> {
    compute_leverage_with_aliased(x, &vec![false; x.ncols()], with_intercept)
}

/// Compute leverage values handling aliased (collinear) columns.
///
/// Aliased columns are excluded from the design before X'X is inverted, so the
/// result stays well defined for the rank-deficient designs the estimators
/// produce (e.g. an interaction column with no treated rows).
///
/// # Arguments
/// * `x` - Feature matrix (n × p)
/// * `aliased` - Boolean mask indicating which columns are aliased
/// * `with_intercept` - Whether to include an intercept column
pub fn compute_leverage_with_aliased(
    x: &Mat<f64>,
    aliased: &[bool],
    with_intercept: bool,
) -> Col<f64> {
    let n = x.nrows();
    let (design, _) = reduced_design(x, aliased, with_intercept);

    if design.ncols() == 0 {
        return Col::from_fn(n, |_| f64::NAN);
    }

    let xtx = design.transpose() * &design;
    match invert_via_qr(&xtx) {
        Some(xtx_inv) => hat_diagonal(&design, &xtx_inv),
        None => Col::from_fn(n, |_| f64::NAN),
    }
}
