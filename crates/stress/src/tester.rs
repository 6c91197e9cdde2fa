use crate::error::StressError;
use analytics::AnalyticsError;
use analytics::returns::{normalized_portfolio_value, simple_returns};
use analytics::statistics::max_drawdown_of_values;
use chrono::NaiveDate;
use configuration::StressParams;
use core_types::{
    CrisisPeriod, PriceMatrix, ReturnSeries, SeriesPoint, WORST_DAY_KEY, WeightVector,
    validate_catalogue,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The single worst daily return inside a stress window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorstDay {
    pub date: NaiveDate,
    #[serde(rename = "return")]
    pub daily_return: f64,
    pub return_pct: f64,
}

/// Portfolio behaviour over one crisis period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressResult {
    #[serde(flatten)]
    pub period: CrisisPeriod,
    pub start_value: f64,
    pub end_value: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    /// Absent when the window holds a single trading day.
    pub worst_day: Option<WorstDay>,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    /// Rows of the price matrix that fall inside the window.
    pub trading_days: usize,
}

/// The worst daily return over the entire price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorstDayRecord {
    pub worst_day_date: NaiveDate,
    pub worst_day_return: f64,
    pub worst_day_return_pct: f64,
    /// Normalised value on the calendar day before the worst day, if that day traded.
    pub portfolio_value_before: Option<f64>,
    pub portfolio_value_after: f64,
}

/// Results of every crisis period that overlapped the data, plus the worst day
/// of the whole history.
///
/// Serialises as one mapping: period ids next to a `worst_day_overall` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressReport {
    #[serde(flatten)]
    pub periods: BTreeMap<String, StressResult>,
    pub worst_day_overall: WorstDayRecord,
}

impl StressReport {
    pub fn get(&self, period_id: &str) -> Option<&StressResult> {
        self.periods.get(period_id)
    }
}

/// Replays a portfolio over a catalogue of crisis periods.
#[derive(Debug, Clone)]
pub struct StressTester {
    catalogue: Vec<CrisisPeriod>,
    base_value: f64,
}

impl StressTester {
    /// Creates a tester over an ordered crisis catalogue.
    ///
    /// Every asset is rebased to `base_value` at the start of each window.
    pub fn new(catalogue: Vec<CrisisPeriod>, base_value: f64) -> Self {
        Self {
            catalogue,
            base_value,
        }
    }

    pub fn from_params(params: &StressParams) -> Self {
        Self::new(params.crisis_periods.clone(), params.base_value)
    }

    pub fn catalogue(&self) -> &[CrisisPeriod] {
        &self.catalogue
    }

    /// Metrics of the portfolio inside one crisis window.
    ///
    /// Returns `Ok(None)` when no trading day of `prices` falls inside the period;
    /// that is logged and is never an error.
    pub fn period_metrics(
        &self,
        prices: &PriceMatrix,
        weights: &WeightVector,
        period: &CrisisPeriod,
    ) -> Result<Option<StressResult>, StressError> {
        let window = prices.slice(period.start_date, period.end_date);
        if window.is_empty() {
            tracing::warn!(
                period = %period.id,
                start = %period.start_date,
                end = %period.end_date,
                "No data available for crisis period, skipping it."
            );
            return Ok(None);
        }

        let values = normalized_portfolio_value(&window, weights, self.base_value)?;
        let (Some(first), Some(last)) = (values.first(), values.last()) else {
            return Ok(None);
        };
        let start_value = first.value;
        let end_value = last.value;
        let total_return = (end_value - start_value) / start_value;

        let worst_day = if values.len() >= 2 {
            worst_point(&simple_returns(&values)?).map(|(_, p)| WorstDay {
                date: p.date,
                daily_return: p.value,
                return_pct: p.value * 100.0,
            })
        } else {
            None
        };

        let max_drawdown = max_drawdown_of_values(&values.values());

        tracing::info!(
            period = %period.id,
            total_return_pct = total_return * 100.0,
            "Calculated stress metrics for crisis period."
        );

        Ok(Some(StressResult {
            period: period.clone(),
            start_value,
            end_value,
            total_return,
            total_return_pct: total_return * 100.0,
            worst_day,
            max_drawdown,
            max_drawdown_pct: max_drawdown * 100.0,
            trading_days: window.len(),
        }))
    }

    /// The single most negative day over the whole history.
    pub fn worst_day_overall(
        &self,
        prices: &PriceMatrix,
        weights: &WeightVector,
    ) -> Result<WorstDayRecord, StressError> {
        let values = normalized_portfolio_value(prices, weights, self.base_value)?;
        let returns = simple_returns(&values)?;

        let (idx, worst) = worst_point(&returns).ok_or(AnalyticsError::InsufficientData {
            metric: "worst day",
            required: 2,
            actual: values.len(),
        })?;

        let portfolio_value_before = worst.date.pred_opt().and_then(|day| values.get(day));
        // returns[idx] is the move into values[idx + 1].
        let portfolio_value_after = values.points()[idx + 1].value;

        Ok(WorstDayRecord {
            worst_day_date: worst.date,
            worst_day_return: worst.value,
            worst_day_return_pct: worst.value * 100.0,
            portfolio_value_before,
            portfolio_value_after,
        })
    }

    /// Runs every crisis period plus the whole-history worst day.
    ///
    /// The catalogue, base value and weights are checked before any period runs.
    /// Periods without data are omitted; they never abort the remaining periods.
    pub fn run_all(
        &self,
        prices: &PriceMatrix,
        weights: &WeightVector,
    ) -> Result<StressReport, StressError> {
        validate_catalogue(&self.catalogue)?;
        if !(self.base_value.is_finite() && self.base_value > 0.0) {
            return Err(StressError::InvalidBaseValue(self.base_value));
        }
        weights.validate()?;
        weights.check_assets(prices)?;

        tracing::info!(periods = self.catalogue.len(), "Running stress tests...");

        #[cfg(feature = "parallel")]
        let outcomes: Vec<_> = self
            .catalogue
            .par_iter()
            .map(|period| self.period_metrics(prices, weights, period))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<_> = self
            .catalogue
            .iter()
            .map(|period| self.period_metrics(prices, weights, period))
            .collect();

        let mut periods = BTreeMap::new();
        for outcome in outcomes {
            if let Some(result) = outcome? {
                periods.insert(result.period.id.clone(), result);
            }
        }

        let worst_day_overall = self.worst_day_overall(prices, weights)?;

        tracing::info!(
            tested = periods.len(),
            key = WORST_DAY_KEY,
            "Stress tests completed."
        );
        Ok(StressReport {
            periods,
            worst_day_overall,
        })
    }
}

/// Position and value of the first point holding the minimum value.
fn worst_point(returns: &ReturnSeries) -> Option<(usize, SeriesPoint)> {
    returns
        .points()
        .iter()
        .copied()
        .enumerate()
        .reduce(|worst, p| if p.1.value < worst.1.value { p } else { worst })
}
