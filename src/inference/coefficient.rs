//! Coefficient inference calculations.

use faer::Col;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Reference distribution for coefficient tests.
///
/// Classical OLS inference uses Student's t with the residual degrees of
/// freedom; sandwich estimators are asymptotic and use the standard normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestDistribution {
    /// Student's t with the given degrees of freedom.
    StudentT(f64),
    /// Standard normal.
    Normal,
}

impl TestDistribution {
    /// Two-sided p-value for a test statistic.
    pub fn two_sided_p_value(self, statistic: f64) -> f64 {
        if !statistic.is_finite() {
            return f64::NAN;
        }
        match self {
            TestDistribution::StudentT(df) => StudentsT::new(0.0, 1.0, df)
                .map_or(f64::NAN, |d| 2.0 * (1.0 - d.cdf(statistic.abs()))),
            TestDistribution::Normal => Normal::new(0.0, 1.0)
                .map_or(f64::NAN, |d| 2.0 * (1.0 - d.cdf(statistic.abs()))),
        }
    }

    /// Critical value `q` such that `P(|T| <= q) = confidence_level`.
    pub fn critical_value(self, confidence_level: f64) -> f64 {
        let quantile = 1.0 - (1.0 - confidence_level) / 2.0;
        match self {
            TestDistribution::StudentT(df) => {
                StudentsT::new(0.0, 1.0, df).map_or(f64::NAN, |d| d.inverse_cdf(quantile))
            }
            TestDistribution::Normal => {
                Normal::new(0.0, 1.0).map_or(f64::NAN, |d| d.inverse_cdf(quantile))
            }
        }
    }
}

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Compute test statistics for coefficients.
    ///
    /// t_j = β_j / SE(β_j)
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            Self::statistic(coefficients[j], std_errors[j])
        })
    }

    /// Test statistic for a single estimate.
    pub fn statistic(estimate: f64, std_error: f64) -> f64 {
        if std_error.is_nan() || std_error == 0.0 {
            f64::NAN
        } else {
            estimate / std_error
        }
    }

    /// Compute two-sided p-values from test statistics.
    pub fn p_values(statistics: &Col<f64>, distribution: TestDistribution) -> Col<f64> {
        if let TestDistribution::StudentT(df) = distribution {
            if df <= 0.0 {
                return Col::from_fn(statistics.nrows(), |_| f64::NAN);
            }
        }
        Col::from_fn(statistics.nrows(), |j| {
            distribution.two_sided_p_value(statistics[j])
        })
    }

    /// Compute confidence intervals for coefficients.
    ///
    /// CI_j = β_j ± q_{α/2} * SE(β_j)
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        distribution: TestDistribution,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let n = coefficients.nrows();
        let critical = match distribution {
            TestDistribution::StudentT(df) if df <= 0.0 => f64::NAN,
            _ => distribution.critical_value(confidence_level),
        };

        let lower = Col::from_fn(n, |j| coefficients[j] - critical * std_errors[j]);
        let upper = Col::from_fn(n, |j| coefficients[j] + critical * std_errors[j]);
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_statistics() {
        let coefficients = Col::from_fn(3, |i| (i + 1) as f64);
        let std_errors = Col::from_fn(3, |i| if i == 2 { 0.0 } else { 0.5 });

        let t_stats = CoefficientInference::t_statistics(&coefficients, &std_errors);

        assert!((t_stats[0] - 2.0).abs() < 1e-10);
        assert!((t_stats[1] - 4.0).abs() < 1e-10);
        assert!(t_stats[2].is_nan());
    }

    #[test]
    fn test_p_values_bounds() {
        let t_stats = Col::from_fn(3, |i| (i + 1) as f64);
        for dist in [TestDistribution::StudentT(10.0), TestDistribution::Normal] {
            let p_vals = CoefficientInference::p_values(&t_stats, dist);
            for p in p_vals.iter() {
                assert!(*p >= 0.0 && *p <= 1.0);
            }
        }
    }

    #[test]
    fn test_normal_critical_value() {
        let q = TestDistribution::Normal.critical_value(0.95);
        assert!((q - 1.959963984540054).abs() < 1e-6);
    }

    #[test]
    fn test_t_wider_than_normal() {
        let coefficients = Col::from_fn(1, |_| 1.0);
        let std_errors = Col::from_fn(1, |_| 0.5);
        let (t_lo, t_hi) = CoefficientInference::confidence_intervals(
            &coefficients,
            &std_errors,
            TestDistribution::StudentT(5.0),
            0.95,
        );
        let (z_lo, z_hi) = CoefficientInference::confidence_intervals(
            &coefficients,
            &std_errors,
            TestDistribution::Normal,
            0.95,
        );
        assert!(t_lo[0] < z_lo[0]);
        assert!(t_hi[0] > z_hi[0]);
        assert!(((t_hi[0] + t_lo[0]) / 2.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_df_gives_nan() {
        let coefficients = Col::from_fn(1, |_| 1.0);
        let std_errors = Col::from_fn(1, |_| 0.5);
        let (lo, hi) = CoefficientInference::confidence_intervals(
            &coefficients,
            &std_errors,
            TestDistribution::StudentT(0.0),
            0.95,
        );
        assert!(lo[0].is_nan() && hi[0].is_nan());
    }
}
