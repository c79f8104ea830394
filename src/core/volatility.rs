//! Derives purchase thresholds from historical log-return volatility.

use crate::core::error::PlanError;
use crate::core::market::RateSeries;
use tracing::debug;

/// Rounds to two decimal places, half away from zero (`f64::round` semantics).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Daily log returns `ln(p_i / p_{i-1})` over consecutive closes. The first
/// point has no return and is dropped.
pub fn log_returns(series: &RateSeries) -> Result<Vec<f64>, PlanError> {
    if series.len() < 2 {
        return Err(PlanError::InsufficientData(format!(
            "need at least 2 closes to compute a return, got {}",
            series.len()
        )));
    }
    let closes: Vec<f64> = series.closes().collect();
    Ok(closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Sample standard deviation with the n-1 denominator.
///
/// A single-element sample has an undefined standard deviation, so fewer
/// than two values is `InsufficientData` rather than NaN.
pub fn sample_std_dev(values: &[f64]) -> Result<f64, PlanError> {
    if values.len() < 2 {
        return Err(PlanError::InsufficientData(format!(
            "need at least 2 returns for a sample standard deviation, got {}",
            values.len()
        )));
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(variance.sqrt())
}

/// Derives one threshold per multiplier: `current_rate * (1 - k * sigma)`,
/// rounded to 2 decimals. With ascending multipliers and `sigma > 0` the
/// thresholds are strictly decreasing; with `sigma == 0` they all equal
/// `current_rate`.
pub fn thresholds(
    current_rate: f64,
    sigma: f64,
    multipliers: &[f64],
) -> Result<Vec<f64>, PlanError> {
    if current_rate <= 0.0 || !current_rate.is_finite() {
        return Err(PlanError::InvalidInput(format!(
            "non-positive current rate {current_rate}"
        )));
    }
    Ok(multipliers
        .iter()
        .map(|k| round2(current_rate * (1.0 - k * sigma)))
        .collect())
}

/// Full pipeline: log returns over the lookback series, sigma, thresholds.
pub fn compute_thresholds(
    series: &RateSeries,
    current_rate: f64,
    multipliers: &[f64],
) -> Result<Vec<f64>, PlanError> {
    let returns = log_returns(series)?;
    let sigma = sample_std_dev(&returns)?;
    debug!(sigma, returns = returns.len(), "Computed log-return volatility");
    thresholds(current_rate, sigma, multipliers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::market::RatePoint;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> RateSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, close)| RatePoint {
                date: start + chrono::Duration::days(i as i64),
                close: *close,
            })
            .collect();
        RateSeries::new(points).unwrap()
    }

    #[test]
    fn test_log_returns_drop_first_point() {
        let s = series(&[100.0, 110.0, 99.0]);
        let returns = log_returns(&s).unwrap();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - (110.0f64 / 100.0).ln()).abs() < 1e-12);
        assert!((returns[1] - (99.0f64 / 110.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_log_returns_require_two_points() {
        let s = series(&[100.0]);
        assert!(matches!(
            log_returns(&s),
            Err(PlanError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_sample_std_dev_uses_n_minus_one() {
        // variance of [1, 2, 3, 4] about mean 2.5 is 5/3
        let sigma = sample_std_dev(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((sigma - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_dev_of_single_return_is_an_error() {
        // A 2-point series yields one return; that must not produce NaN.
        assert!(matches!(
            sample_std_dev(&[0.01]),
            Err(PlanError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_thresholds_strictly_decreasing_with_positive_sigma() {
        let t = thresholds(1400.0, 0.02, &[0.5, 1.0, 1.5]).unwrap();
        assert_eq!(t, vec![1386.0, 1372.0, 1358.0]);
        assert!(t[0] > t[1] && t[1] > t[2]);
    }

    #[test]
    fn test_thresholds_collapse_to_rate_with_zero_sigma() {
        let t = thresholds(1400.0, 0.0, &[0.5, 1.0, 1.5]).unwrap();
        assert_eq!(t, vec![1400.0, 1400.0, 1400.0]);
    }

    #[test]
    fn test_thresholds_reject_non_positive_rate() {
        assert!(matches!(
            thresholds(0.0, 0.02, &[0.5]),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            thresholds(-1.0, 0.02, &[0.5]),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_thresholds_round_to_two_decimals() {
        // 1234.56 * (1 - 0.5 * 0.0123) = 1226.967456
        let t = thresholds(1234.56, 0.0123, &[0.5]).unwrap();
        assert_eq!(t, vec![1226.97]);
    }

    #[test]
    fn test_compute_thresholds_pipeline() {
        let s = series(&[100.0, 102.0, 99.0, 101.0, 100.5]);
        let returns = log_returns(&s).unwrap();
        let sigma = sample_std_dev(&returns).unwrap();
        let expected = thresholds(100.5, sigma, &[0.5, 1.0, 1.5]).unwrap();

        let got = compute_thresholds(&s, 100.5, &[0.5, 1.0, 1.5]).unwrap();
        assert_eq!(got, expected);
        assert!(got[0] > got[1] && got[1] > got[2]);
    }

    #[test]
    fn test_compute_thresholds_two_point_series_is_insufficient() {
        let s = series(&[100.0, 101.0]);
        assert!(matches!(
            compute_thresholds(&s, 101.0, &[0.5, 1.0, 1.5]),
            Err(PlanError::InsufficientData(_))
        ));
    }
}
