//! Parameter covariance estimators (classical and heteroskedasticity-consistent).

use crate::core::CovarianceType;
use crate::diagnostics::hat_diagonal;
use crate::utils::{invert_via_qr, reduced_design};
use faer::{Col, Mat, Scale};

/// Computes the covariance matrix of the OLS parameter vector.
///
/// The returned matrix is indexed by full parameter position: the intercept
/// first, then one entry per column of `x`. Rows and columns belonging to
/// aliased coefficients are NaN.
pub struct ParameterCovariance;

impl ParameterCovariance {
    /// Compute the covariance for the requested estimator.
    ///
    /// # Arguments
    /// * `x` - Feature matrix without the intercept column
    /// * `residuals` - OLS residuals
    /// * `mse` - Residual variance estimate (RSS / residual df)
    /// * `aliased` - Aliased-coefficient mask
    /// * `covariance_type` - Estimator to use
    pub fn compute(
        x: &Mat<f64>,
        residuals: &Col<f64>,
        mse: f64,
        aliased: &[bool],
        covariance_type: CovarianceType,
    ) -> Result<Mat<f64>, &'static str> {
        let (design, positions) = reduced_design(x, aliased, true);
        let xtx = design.transpose() * &design;
        let bread = invert_via_qr(&xtx).ok_or("design cross-product is singular")?;

        let reduced = match covariance_type {
            CovarianceType::NonRobust => Scale(mse) * &bread,
            robust => Self::sandwich(&design, &bread, residuals, robust),
        };

        let n_full = x.ncols() + 1;
        let mut full = Mat::from_fn(n_full, n_full, |_, _| f64::NAN);
        for (a, &pa) in positions.iter().enumerate() {
            for (b, &pb) in positions.iter().enumerate() {
                full[(pa, pb)] = reduced[(a, b)];
            }
        }
        Ok(full)
    }

    /// Sandwich estimator `(X'X)⁻¹ X' diag(ω) X (X'X)⁻¹`.
    fn sandwich(
        design: &Mat<f64>,
        bread: &Mat<f64>,
        residuals: &Col<f64>,
        covariance_type: CovarianceType,
    ) -> Mat<f64> {
        let n = design.nrows();
        let k = design.ncols();
        let leverage = hat_diagonal(design, bread);

        let omega = Col::from_fn(n, |i| {
            let e2 = residuals[i] * residuals[i];
            let one_minus_h = (1.0 - leverage[i]).max(1e-14);
            match covariance_type {
                CovarianceType::HC0 => e2,
                CovarianceType::HC1 => e2 * n as f64 / (n - k).max(1) as f64,
                CovarianceType::HC2 => e2 / one_minus_h,
                CovarianceType::HC3 | CovarianceType::NonRobust => {
                    e2 / (one_minus_h * one_minus_h)
                }
            }
        });
        let weighted = Mat::from_fn(n, k, |i, j| omega[i] * design[(i, j)]);
        let meat = design.transpose() * &weighted;

        bread * &meat * bread
    }

    /// Standard errors from the covariance diagonal.
    pub fn std_errors(covariance: &Mat<f64>) -> Col<f64> {
        Col::from_fn(covariance.nrows(), |j| {
            let var = covariance[(j, j)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        })
    }
}
