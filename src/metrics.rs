use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error: `mean((y_true - y_pred)^2)`.
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        check_lengths(y_true, y_pred)?;
        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        Ok(sum_sq / y_true.len() as f64)
    }

    /// Root Mean Squared Error, in the same units as the target.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        Ok(Self::mse(y_true, y_pred)?.sqrt())
    }

    /// Mean Absolute Error: `mean(|y_true - y_pred|)`.
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        check_lengths(y_true, y_pred)?;
        let sum_abs: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).abs())
            .sum();
        Ok(sum_abs / y_true.len() as f64)
    }

    /// Coefficient of determination.
    ///
    /// ```text
    /// R² = 1 - SS_res / SS_tot
    /// ```
    ///
    /// where `SS_res = Σ(y_true - y_pred)²` and `SS_tot = Σ(y_true - mean(y_true))²`.
    /// 1 is a perfect fit; values can be negative for a model worse than the mean.
    /// With constant targets the result is 1 for a perfect fit and 0 otherwise.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        check_lengths(y_true, y_pred)?;
        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }

    /// Calculate all metrics at once.
    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> Result<RegressionMetrics> {
        let mse = Self::mse(y_true, y_pred)?;
        Ok(RegressionMetrics {
            mse,
            rmse: mse.sqrt(),
            mae: Self::mae(y_true, y_pred)?,
            r_squared: Self::r_squared(y_true, y_pred)?,
        })
    }
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::InvalidShape {
            expected: format!("{} predictions", y_true.len()),
            got: y_pred.len().to_string(),
        });
    }
    if y_true.is_empty() {
        return Err(Error::EmptyData("no samples to score".into()));
    }
    Ok(())
}

/// All regression metrics of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
}

impl RegressionMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mse => self.mse,
            Metric::Rmse => self.rmse,
            Metric::Mae => self.mae,
            Metric::RSquared => self.r_squared,
        }
    }
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", Metric::Mse, self.mse)?;
        writeln!(f, "{}: {}", Metric::Rmse, self.rmse)?;
        writeln!(f, "{}: {}", Metric::Mae, self.mae)?;
        write!(f, "{}: {}", Metric::RSquared, self.r_squared)
    }
}

/// A single metric, selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mse,
    Rmse,
    Mae,
    #[value(name = "r2")]
    #[serde(rename = "r2")]
    RSquared,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Mse => "mse",
            Metric::Rmse => "rmse",
            Metric::Mae => "mae",
            Metric::RSquared => "r2",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse_perfect() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(Metrics::mse(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_mse_error() {
        let y_true = [1.0, 2.0, 3.0, 4.0];
        let y_pred = [2.0, 3.0, 4.0, 5.0];
        // Errors: [-1, -1, -1, -1], squared: [1, 1, 1, 1], mean: 1.0
        assert_abs_diff_eq!(Metrics::mse(&y_true, &y_pred).unwrap(), 1.0);
        assert_abs_diff_eq!(Metrics::rmse(&y_true, &y_pred).unwrap(), 1.0);
    }

    #[test]
    fn test_mae() {
        let y_true = [1.0, 2.0, 3.0, 4.0];
        let y_pred = [2.0, 1.0, 6.0, 4.0];
        // abs errors: [1, 1, 3, 0], mean: 1.25
        assert_abs_diff_eq!(Metrics::mae(&y_true, &y_pred).unwrap(), 1.25);
    }

    #[test]
    fn test_r_squared_mean_predictor_is_zero() {
        let y_true = [1.0, 2.0, 3.0, 4.0];
        let y_pred = [2.5; 4];
        assert_abs_diff_eq!(Metrics::r_squared(&y_true, &y_pred).unwrap(), 0.0);
    }

    #[test]
    fn test_r_squared_constant_targets() {
        let y_true = [2.0, 2.0, 2.0];
        assert_eq!(Metrics::r_squared(&y_true, &y_true).unwrap(), 1.0);
        assert_eq!(Metrics::r_squared(&y_true, &[2.0, 2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch_and_empty_are_errors() {
        assert!(matches!(
            Metrics::mse(&[1.0, 2.0], &[1.0]),
            Err(Error::InvalidShape { .. })
        ));
        assert!(matches!(Metrics::mae(&[], &[]), Err(Error::EmptyData(_))));
    }

    #[test]
    fn test_calculate_all_and_get() {
        let y_true = [1.0, 2.0, 3.0, 4.0];
        let y_pred = [2.0, 3.0, 4.0, 5.0];
        let m = Metrics::calculate_all(&y_true, &y_pred).unwrap();

        assert_abs_diff_eq!(m.get(Metric::Mse), 1.0);
        assert_abs_diff_eq!(m.get(Metric::Mae), 1.0);
        assert_abs_diff_eq!(m.get(Metric::RSquared), 0.2);
    }

    #[test]
    fn test_display_lists_every_metric() {
        let m = RegressionMetrics {
            mse: 4.0,
            rmse: 2.0,
            mae: 1.5,
            r_squared: 0.5,
        };
        assert_eq!(m.to_string(), "mse: 4\nrmse: 2\nmae: 1.5\nr2: 0.5");
    }
}
