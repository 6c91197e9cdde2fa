//! Risk statistics over a portfolio return series.
//!
//! Every function is pure and independent of the others. Functions that need a
//! variance or a difference require at least two observations and report
//! `AnalyticsError::InsufficientData` instead of returning NaN.
//!
//! Conventions:
//! - standard deviations are sample deviations (`n - 1` denominator),
//! - annualisation multiplies daily figures by `sqrt(TRADING_DAYS_PER_YEAR)`,
//! - VaR is reported as a positive loss magnitude,
//! - percentiles interpolate linearly between order statistics.

use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{ReturnSeries, SeriesPoint, TimeSeries};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::HashMap;

/// Assumed number of trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Standard deviations at or below this are treated as zero when they divide.
pub const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Result of the drawdown analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drawdown {
    /// Largest peak-to-trough decline as a positive fraction.
    pub max_drawdown: f64,
    /// `(C_t - M_t) / M_t` for every date, always `<= 0`.
    pub drawdown_series: TimeSeries,
}

/// One bin of the return histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub bin_mid: f64,
    pub count: usize,
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance. Callers guarantee at least two values.
fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample covariance of two equally long slices with at least two values.
fn sample_covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let mx = mean(xs);
    let my = mean(ys);
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (xs.len() - 1) as f64
}

/// Sample standard deviation.
pub fn sample_std(values: &[f64]) -> Result<f64, AnalyticsError> {
    AnalyticsError::require("standard deviation", 2, values.len())?;
    Ok(sample_variance(values).sqrt())
}

/// Percentile `q` in `[0, 100]` with linear interpolation between order statistics.
///
/// Matches the default method of numpy's `percentile`: the rank is
/// `q / 100 * (n - 1)` over the sorted sample.
pub fn percentile(values: &[f64], q: f64) -> Result<f64, AnalyticsError> {
    AnalyticsError::require("percentile", 1, values.len())?;
    if !(0.0..=100.0).contains(&q) {
        return Err(AnalyticsError::InvalidParameter(format!(
            "percentile must lie in [0, 100], got {q}"
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Volatility of returns, annualised by `sqrt(252)` when `annualize` is set.
pub fn volatility(returns: &ReturnSeries, annualize: bool) -> Result<f64, AnalyticsError> {
    let values = returns.values();
    AnalyticsError::require("volatility", 2, values.len())?;
    let daily = sample_variance(&values).sqrt();
    Ok(if annualize {
        daily * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        daily
    })
}

/// Mean daily return scaled to a year.
pub fn annual_return(returns: &ReturnSeries) -> Result<f64, AnalyticsError> {
    let values = returns.values();
    AnalyticsError::require("annual return", 1, values.len())?;
    Ok(mean(&values) * TRADING_DAYS_PER_YEAR)
}

fn check_confidence(confidence: f64) -> Result<(), AnalyticsError> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidParameter(format!(
            "confidence level must lie in (0, 1), got {confidence}"
        )))
    }
}

/// Historical (empirical) one-day VaR.
///
/// The `(1 - confidence) * 100`-th percentile of the returns, negated. A sample
/// whose lower tail is still a gain produces a non-positive VaR.
pub fn historical_var(returns: &ReturnSeries, confidence: f64) -> Result<f64, AnalyticsError> {
    check_confidence(confidence)?;
    let values = returns.values();
    AnalyticsError::require("historical VaR", 2, values.len())?;
    let alpha = 1.0 - confidence;
    Ok(-percentile(&values, alpha * 100.0)?)
}

/// Parametric (variance-covariance) one-day VaR under a normal assumption.
///
/// `-(mu + sigma * z)` with `z = Phi^-1(1 - confidence)`.
pub fn parametric_var(returns: &ReturnSeries, confidence: f64) -> Result<f64, AnalyticsError> {
    check_confidence(confidence)?;
    let values = returns.values();
    AnalyticsError::require("parametric VaR", 2, values.len())?;

    let mu = mean(&values);
    let sigma = sample_variance(&values).sqrt();
    let z = standard_normal_quantile(1.0 - confidence)?;
    Ok(-(mu + sigma * z))
}

/// Scales a one-day VaR to a year.
pub fn annualize_var(daily_var: f64) -> f64 {
    daily_var * TRADING_DAYS_PER_YEAR.sqrt()
}

fn standard_normal_quantile(p: f64) -> Result<f64, AnalyticsError> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Calculation(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

/// Annualised Sharpe ratio: `(mean * 252 - rf) / annualised volatility`.
pub fn sharpe_ratio(
    returns: &ReturnSeries,
    risk_free_rate_annual: f64,
) -> Result<f64, AnalyticsError> {
    let annual_vol = volatility(returns, true)?;
    if annual_vol <= ZERO_VARIANCE_TOLERANCE {
        return Err(AnalyticsError::UndefinedRatio("Sharpe ratio"));
    }
    let annual_ret = annual_return(returns)?;
    Ok((annual_ret - risk_free_rate_annual) / annual_vol)
}

/// Peak-to-trough analysis of the compounded return series.
pub fn max_drawdown(returns: &ReturnSeries) -> Result<Drawdown, AnalyticsError> {
    AnalyticsError::require("max drawdown", 1, returns.len())?;

    let mut cumulative = 1.0;
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;

    let drawdown_series: TimeSeries = returns
        .points()
        .iter()
        .map(|p| {
            cumulative *= 1.0 + p.value;
            peak = peak.max(cumulative);
            let drawdown = (cumulative - peak) / peak;
            worst = worst.min(drawdown);
            SeriesPoint {
                date: p.date,
                value: drawdown,
            }
        })
        .collect();

    Ok(Drawdown {
        max_drawdown: worst.abs(),
        drawdown_series,
    })
}

/// Drawdown of an already-compounded value series, as a positive fraction.
pub fn max_drawdown_of_values(values: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;
    for &v in values {
        peak = peak.max(v);
        worst = worst.min((v - peak) / peak);
    }
    worst.abs()
}

/// Trailing-window annualised volatility.
///
/// A point is emitted for the last date of each full window; the first
/// `window - 1` dates have no value and are omitted.
pub fn rolling_volatility(
    returns: &ReturnSeries,
    window: usize,
) -> Result<ReturnSeries, AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "rolling window must be at least 2, got {window}"
        )));
    }
    let points = returns.points();
    if points.len() < window {
        return Ok(TimeSeries::new());
    }
    let values = returns.values();
    let scale = TRADING_DAYS_PER_YEAR.sqrt();

    Ok(values
        .windows(window)
        .zip(&points[window - 1..])
        .map(|(slice, point)| SeriesPoint {
            date: point.date,
            value: sample_variance(slice).sqrt() * scale,
        })
        .collect())
}

/// Equal-width histogram over `[min, max]` of the returns.
///
/// Bin edges and edge handling follow numpy's `histogram`: every bin is half-open
/// except the last, which includes `max`. A constant sample is spread over
/// `[value - 0.5, value + 0.5]`.
pub fn return_distribution(
    returns: &ReturnSeries,
    num_bins: usize,
) -> Result<Vec<HistogramBin>, AnalyticsError> {
    if num_bins == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "histogram needs at least one bin".to_string(),
        ));
    }
    let values = returns.values();
    AnalyticsError::require("return distribution", 1, values.len())?;

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / num_bins as f64;
    let edges: Vec<f64> = (0..=num_bins)
        .map(|i| {
            if i == num_bins {
                hi
            } else {
                lo + width * i as f64
            }
        })
        .collect();

    let mut counts = vec![0usize; num_bins];
    for &v in &values {
        let mut idx = (((v - lo) / width) as usize).min(num_bins - 1);
        // Correct for rounding so membership agrees with the emitted edges.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < num_bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            bin_start: edges[i],
            bin_end: edges[i + 1],
            bin_mid: (edges[i] + edges[i + 1]) / 2.0,
            count,
        })
        .collect())
}

/// Portfolio beta against a benchmark: `Cov(p, b) / Var(b)`.
///
/// Only dates present in both series are used.
pub fn beta(
    portfolio: &ReturnSeries,
    benchmark: &ReturnSeries,
) -> Result<f64, AnalyticsError> {
    let (p, b) = align(portfolio, benchmark);
    if p.is_empty() {
        return Err(AnalyticsError::MisalignedSeries("beta"));
    }
    AnalyticsError::require("beta", 2, p.len())?;

    let benchmark_variance = sample_variance(&b);
    if benchmark_variance.sqrt() <= ZERO_VARIANCE_TOLERANCE {
        return Err(AnalyticsError::UndefinedRatio("beta"));
    }
    let beta = sample_covariance(&p, &b) / benchmark_variance;
    if !beta.is_finite() {
        return Err(AnalyticsError::Calculation(
            "beta is not a finite number; inputs contain non-finite returns".to_string(),
        ));
    }
    Ok(beta)
}

/// Inner join of two series on their dates.
fn align(left: &ReturnSeries, right: &ReturnSeries) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<NaiveDate, f64> =
        right.points().iter().map(|p| (p.date, p.value)).collect();
    left.points()
        .iter()
        .filter_map(|p| lookup.get(&p.date).map(|&r| (p.value, r)))
        .unzip()
}

pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let sx = sample_variance(xs).sqrt();
    let sy = sample_variance(ys).sqrt();
    if sx <= ZERO_VARIANCE_TOLERANCE || sy <= ZERO_VARIANCE_TOLERANCE {
        return None;
    }
    Some((sample_covariance(xs, ys) / (sx * sy)).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn series(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let dates = (0..values.len() as u64)
            .map(|i| start + chrono::Days::new(i))
            .collect();
        TimeSeries::from_parts(dates, values.to_vec()).unwrap()
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 100.0).unwrap(), 5.0);
        assert_relative_eq!(percentile(&values, 5.0).unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(percentile(&values, 50.0).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn volatility_is_sample_std() {
        let r = series(&[0.01, -0.02, 0.03]);
        // mean 0.00666..., squared deviations sum 0.0012666..., / 2
        let expected = (0.001_266_666_666_666_666_7_f64 / 2.0).sqrt();
        assert_relative_eq!(volatility(&r, false).unwrap(), expected, max_relative = 1e-12);
        assert_relative_eq!(
            volatility(&r, true).unwrap(),
            expected * 252f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn volatility_needs_two_observations() {
        assert!(matches!(
            volatility(&series(&[0.01]), true),
            Err(AnalyticsError::InsufficientData { required: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn historical_var_matches_numpy_percentile() {
        let r = series(&[-0.05, -0.02, 0.0, 0.01, 0.03, 0.04, -0.01, 0.02, 0.015, -0.03]);
        // sorted: -0.05 -0.03 -0.02 -0.01 0 0.01 0.015 0.02 0.03 0.04
        // rank 0.05 * 9 = 0.45 -> -0.05 + 0.45 * 0.02 = -0.041
        assert_relative_eq!(historical_var(&r, 0.95).unwrap(), 0.041, max_relative = 1e-12);
        // rank 0.01 * 9 = 0.09 -> -0.05 + 0.09 * 0.02 = -0.0482
        assert_relative_eq!(historical_var(&r, 0.99).unwrap(), 0.0482, max_relative = 1e-12);
    }

    #[test]
    fn var_rejects_out_of_range_confidence() {
        let r = series(&[0.01, 0.02]);
        for confidence in [0.0, 1.0, 1.5, -0.1] {
            assert!(matches!(
                historical_var(&r, confidence),
                Err(AnalyticsError::InvalidParameter(_))
            ));
            assert!(parametric_var(&r, confidence).is_err());
        }
    }

    #[test]
    fn parametric_var_uses_normal_quantile() {
        let r = series(&[0.01, -0.02, 0.03, -0.01]);
        let values = r.values();
        let mu = mean(&values);
        let sigma = sample_std(&values).unwrap();
        let expected = -(mu - 1.6448536269514722 * sigma);
        assert_relative_eq!(parametric_var(&r, 0.95).unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn var_is_positive_for_losing_series() {
        let r = series(&[-0.02, -0.01, -0.03, 0.005, -0.015]);
        assert!(historical_var(&r, 0.95).unwrap() > 0.0);
        assert!(parametric_var(&r, 0.95).unwrap() > 0.0);
        assert!(historical_var(&r, 0.99).unwrap() > 0.0);
        assert!(parametric_var(&r, 0.99).unwrap() > 0.0);
    }

    #[test]
    fn no_tail_loss_for_identical_gains() {
        let r = series(&[0.01; 8]);
        for confidence in [0.5, 0.95, 0.99] {
            assert!(historical_var(&r, confidence).unwrap() <= 0.0);
        }
    }

    #[test]
    fn sharpe_ratio_formula() {
        let r = series(&[0.01, -0.005, 0.02, 0.0]);
        let vol = volatility(&r, true).unwrap();
        let expected = (mean(&r.values()) * 252.0 - 0.04) / vol;
        assert_relative_eq!(sharpe_ratio(&r, 0.04).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn sharpe_ratio_with_flat_returns_is_undefined() {
        let r = series(&[0.0, 0.0, 0.0]);
        assert_eq!(
            sharpe_ratio(&r, 0.04),
            Err(AnalyticsError::UndefinedRatio("Sharpe ratio"))
        );
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let r = series(&[0.10, -0.20, 0.05]);
        let dd = max_drawdown(&r).unwrap();
        // values 1.1, 0.88, 0.924; peak 1.1
        let values = dd.drawdown_series.values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 0.0);
        assert_relative_eq!(values[1], -0.2, max_relative = 1e-12);
        assert_relative_eq!(values[2], 0.924 / 1.1 - 1.0, max_relative = 1e-12);
        assert_relative_eq!(dd.max_drawdown, 0.2, max_relative = 1e-12);
    }

    #[test]
    fn drawdown_is_zero_for_monotone_growth() {
        let dd = max_drawdown(&series(&[0.01, 0.02, 0.005, 0.03])).unwrap();
        assert_eq!(dd.max_drawdown, 0.0);
        assert!(dd.drawdown_series.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn drawdown_peak_starts_at_first_compounded_value() {
        let dd = max_drawdown(&series(&[-0.1, 0.05, -0.05])).unwrap();
        let values = dd.drawdown_series.values();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 0.0);
        assert_relative_eq!(values[2], -0.05, max_relative = 1e-12);
        assert_relative_eq!(dd.max_drawdown, 0.05, max_relative = 1e-12);
    }

    #[test]
    fn drawdown_of_values_matches_returns_version() {
        let values = [100.0, 110.0, 88.0, 92.4];
        assert_relative_eq!(max_drawdown_of_values(&values), 0.2, max_relative = 1e-12);
    }

    #[test]
    fn rolling_volatility_omits_warmup() {
        let r = series(&[0.01, -0.01, 0.02, 0.0, -0.02]);
        let rolling = rolling_volatility(&r, 3).unwrap();
        assert_eq!(rolling.len(), 3);
        assert_eq!(rolling.dates(), r.dates()[2..].to_vec());
        let expected = sample_std(&[0.01, -0.01, 0.02]).unwrap() * 252f64.sqrt();
        assert_relative_eq!(rolling.values()[0], expected, max_relative = 1e-12);
    }

    #[test]
    fn rolling_volatility_with_short_history_is_empty() {
        let rolling = rolling_volatility(&series(&[0.01, 0.02]), 30).unwrap();
        assert!(rolling.is_empty());
    }

    #[test]
    fn histogram_edges_span_min_to_max() {
        let r = series(&[0.0, 0.1, 0.2, 0.3, 0.4, 1.0]);
        let bins = return_distribution(&r, 5).unwrap();
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].bin_start, 0.0);
        assert_eq!(bins[4].bin_end, 1.0);
        assert_abs_diff_eq!(bins[0].bin_end, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(bins[0].bin_mid, 0.1, epsilon = 1e-12);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        // 0.0, 0.1 | 0.2, 0.3 | 0.4 | - | 1.0 (max lands in the last bin)
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(counts.iter().sum::<usize>(), r.len());
    }

    #[test]
    fn histogram_of_constant_sample() {
        let bins = return_distribution(&series(&[0.02, 0.02]), 2).unwrap();
        assert_relative_eq!(bins[0].bin_start, -0.48, max_relative = 1e-12);
        assert_relative_eq!(bins[1].bin_end, 0.52, max_relative = 1e-12);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn histogram_rejects_zero_bins() {
        assert!(matches!(
            return_distribution(&series(&[0.01]), 0),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn beta_of_identical_series_is_one() {
        let r = series(&[0.01, -0.02, 0.015, 0.005, -0.01]);
        assert_relative_eq!(beta(&r, &r).unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn beta_of_scaled_series() {
        let b = series(&[0.01, -0.02, 0.015, 0.005]);
        let p = series(&b.values().iter().map(|v| v * 1.5).collect::<Vec<_>>());
        assert_relative_eq!(beta(&p, &b).unwrap(), 1.5, max_relative = 1e-12);
    }

    #[test]
    fn beta_uses_shared_dates_only() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let d = |i: u64| start + chrono::Days::new(i);
        let p = TimeSeries::from_parts(vec![d(0), d(1), d(2), d(3)], vec![0.01, 0.02, 0.5, -0.01])
            .unwrap();
        let b = TimeSeries::from_parts(vec![d(0), d(1), d(3)], vec![0.01, 0.02, -0.01]).unwrap();
        assert_relative_eq!(beta(&p, &b).unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn beta_failure_modes() {
        let p = series(&[0.01, 0.02, 0.03]);
        let later = TimeSeries::from_parts(
            vec![NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()],
            vec![0.01],
        )
        .unwrap();
        assert_eq!(beta(&p, &later), Err(AnalyticsError::MisalignedSeries("beta")));

        let one = TimeSeries::from_parts(vec![p.dates()[0]], vec![0.01]).unwrap();
        assert!(matches!(
            beta(&p, &one),
            Err(AnalyticsError::InsufficientData { .. })
        ));

        let flat = series(&[0.01, 0.01, 0.01]);
        assert_eq!(beta(&p, &flat), Err(AnalyticsError::UndefinedRatio("beta")));
    }

    #[test]
    fn beta_rejects_non_finite_returns() {
        // Returns of a benchmark that touched zero: 400 -> 0 -> 398 -> 410.
        let p = series(&[0.05, -0.06, 0.09]);
        let b = series(&[-1.0, f64::INFINITY, 12.0 / 398.0]);
        assert!(matches!(beta(&p, &b), Err(AnalyticsError::Calculation(_))));
    }
}
