use crate::error::AnalyticsError;
use core_types::{
    PortfolioValueSeries, PriceMatrix, ReturnSeries, SeriesPoint, TimeSeries, WeightVector,
};

/// Simple returns `(P_t - P_{t-1}) / P_{t-1}` of one price column.
///
/// The result is one element shorter than the input.
pub fn asset_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Daily weighted portfolio returns.
///
/// Weights are converted from percentage points to fractions; each asset's simple
/// return is scaled by its fraction and summed per day. The first date has no prior
/// price and is dropped, so the output has `prices.len() - 1` points.
pub fn portfolio_returns(
    prices: &PriceMatrix,
    weights: &WeightVector,
) -> Result<ReturnSeries, AnalyticsError> {
    weights.check_assets(prices)?;
    AnalyticsError::require("portfolio returns", 2, prices.len())?;

    let mut totals = vec![0.0; prices.len() - 1];
    for (asset, column) in prices.columns() {
        let fraction = weights.fraction(asset);
        if fraction == 0.0 {
            continue;
        }
        for (total, r) in totals.iter_mut().zip(asset_returns(column)) {
            *total += fraction * r;
        }
    }

    Ok(prices.dates()[1..]
        .iter()
        .zip(totals)
        .map(|(&date, value)| SeriesPoint { date, value })
        .collect())
}

/// Simple returns of an arbitrary dated series (benchmark prices, portfolio values).
pub fn simple_returns(series: &TimeSeries) -> Result<ReturnSeries, AnalyticsError> {
    AnalyticsError::require("simple returns", 2, series.len())?;
    Ok(series
        .points()
        .windows(2)
        .map(|w| SeriesPoint {
            date: w[1].date,
            value: (w[1].value - w[0].value) / w[0].value,
        })
        .collect())
}

/// Compounds returns from `initial_value`: `V_t = V_0 * prod(1 + r_i)`.
///
/// Never fails; an empty return series yields an empty value series.
pub fn portfolio_value(returns: &ReturnSeries, initial_value: f64) -> PortfolioValueSeries {
    let mut value = initial_value;
    returns
        .points()
        .iter()
        .map(|p| {
            value *= 1.0 + p.value;
            SeriesPoint {
                date: p.date,
                value,
            }
        })
        .collect()
}

/// Weighted value of the portfolio with every asset rebased to `base` on the first
/// date of `prices`.
///
/// Rebasing happens before weighting so each asset contributes in proportion to its
/// weight rather than its raw price level.
pub fn normalized_portfolio_value(
    prices: &PriceMatrix,
    weights: &WeightVector,
    base: f64,
) -> Result<PortfolioValueSeries, AnalyticsError> {
    weights.check_assets(prices)?;

    let mut totals = vec![0.0; prices.len()];
    for (asset, column) in prices.columns() {
        let fraction = weights.fraction(asset);
        let Some(&first) = column.first() else {
            continue;
        };
        for (total, price) in totals.iter_mut().zip(column) {
            *total += fraction * price / first * base;
        }
    }

    Ok(prices
        .dates()
        .iter()
        .zip(totals)
        .map(|(&date, value)| SeriesPoint { date, value })
        .collect())
}
