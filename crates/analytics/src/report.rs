use crate::correlation::CorrelationMatrix;
use crate::statistics::HistogramBin;
use core_types::{PortfolioValueSeries, ReturnSeries, TimeSeries};
use serde::Serialize;

/// Value-at-Risk at the two reported confidence levels, both methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarSet {
    pub historical_95: f64,
    pub historical_99: f64,
    pub parametric_95: f64,
    pub parametric_99: f64,
}

/// One-day VaR and its `sqrt(252)` annual scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarReport {
    pub daily: VarSet,
    pub annual: VarSet,
}

/// A metric the engine could not produce, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricIssue {
    pub metric: String,
    pub reason: String,
}

/// The complete set of risk metrics for one portfolio.
///
/// This struct is the final output of the `AnalyticsEngine`. Fields wrapped in
/// `Option<>` are `None` when that one metric could not be computed; the matching
/// entry in `unavailable` carries the reason. `beta` is also `None` when no
/// benchmark was supplied, without an issue being recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsBundle {
    /// Number of daily portfolio returns the metrics were computed from.
    pub observations: usize,

    // I. Return and volatility
    pub annual_return: Option<f64>,
    pub daily_volatility: Option<f64>,
    pub annual_volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,

    // II. Tail risk and drawdown
    pub max_drawdown: Option<f64>,
    pub var: Option<VarReport>,

    // III. Cross-asset
    pub beta: Option<f64>,
    pub correlation_matrix: Option<CorrelationMatrix>,

    // IV. Chart series
    pub portfolio_values: PortfolioValueSeries,
    pub drawdown_series: Option<TimeSeries>,
    pub rolling_volatility: Option<ReturnSeries>,
    pub return_distribution: Option<Vec<HistogramBin>>,

    pub unavailable: Vec<MetricIssue>,
}

impl MetricsBundle {
    /// Whether `metric` was skipped.
    pub fn is_unavailable(&self, metric: &str) -> bool {
        self.unavailable.iter().any(|issue| issue.metric == metric)
    }
}
