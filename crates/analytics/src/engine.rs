use crate::correlation::correlation_matrix;
use crate::error::AnalyticsError;
use crate::report::{MetricIssue, MetricsBundle, VarReport, VarSet};
use crate::returns::{portfolio_returns, portfolio_value, simple_returns};
use crate::statistics::{self, annualize_var};
use configuration::MetricsParams;
use core_types::{PriceMatrix, ReturnSeries, TimeSeries, WeightVector};

/// Confidence level of the "95" VaR columns.
pub const CONFIDENCE_95: f64 = 0.95;
/// Confidence level of the "99" VaR columns.
pub const CONFIDENCE_99: f64 = 0.99;

/// A stateless calculator that composes every statistic into a `MetricsBundle`.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    params: MetricsParams,
}

impl AnalyticsEngine {
    pub fn new(params: MetricsParams) -> Self {
        Self { params }
    }

    /// The main entry point for calculating portfolio risk metrics.
    ///
    /// # Arguments
    ///
    /// * `prices` - Price history of every asset in the portfolio.
    /// * `weights` - Allocation in percentage points.
    /// * `benchmark` - Optional benchmark price series, used only for beta.
    ///
    /// # Returns
    ///
    /// Invalid weights, invalid benchmark prices, invalid parameters or fewer than two
    /// price rows fail the whole call. Past that point each metric is computed on its
    /// own and a failure only blanks that field, recording a `MetricIssue` in the bundle.
    pub fn calculate(
        &self,
        prices: &PriceMatrix,
        weights: &WeightVector,
        benchmark: Option<&TimeSeries>,
    ) -> Result<MetricsBundle, AnalyticsError> {
        weights.validate()?;
        if let Some(bench) = benchmark {
            bench.check_prices("benchmark")?;
        }
        self.params
            .validate()
            .map_err(|e| AnalyticsError::InvalidParameter(e.to_string()))?;

        tracing::info!(
            assets = prices.assets().len(),
            days = prices.len(),
            "Calculating risk metrics..."
        );

        let returns = portfolio_returns(prices, weights)?;
        let mut issues = Vec::new();

        let annual_return = record(
            &mut issues,
            "annual_return",
            statistics::annual_return(&returns),
        );
        let daily_volatility = record(
            &mut issues,
            "daily_volatility",
            statistics::volatility(&returns, false),
        );
        let annual_volatility = record(
            &mut issues,
            "annual_volatility",
            statistics::volatility(&returns, true),
        );
        let sharpe_ratio = record(
            &mut issues,
            "sharpe_ratio",
            statistics::sharpe_ratio(&returns, self.params.risk_free_rate),
        );

        let drawdown = record(&mut issues, "max_drawdown", statistics::max_drawdown(&returns));
        let var = record(&mut issues, "var", value_at_risk(&returns));

        let beta = benchmark.and_then(|bench| {
            record(
                &mut issues,
                "beta",
                simple_returns(bench).and_then(|b| statistics::beta(&returns, &b)),
            )
        });
        let correlation = record(&mut issues, "correlation_matrix", correlation_matrix(prices));

        let rolling_volatility = record(
            &mut issues,
            "rolling_volatility",
            statistics::rolling_volatility(&returns, self.params.rolling_window),
        );
        let return_distribution = record(
            &mut issues,
            "return_distribution",
            statistics::return_distribution(&returns, self.params.histogram_bins),
        );

        let (max_drawdown, drawdown_series) = match drawdown {
            Some(d) => (Some(d.max_drawdown), Some(d.drawdown_series)),
            None => (None, None),
        };

        let bundle = MetricsBundle {
            observations: returns.len(),
            annual_return,
            daily_volatility,
            annual_volatility,
            sharpe_ratio,
            max_drawdown,
            var,
            beta,
            correlation_matrix: correlation,
            portfolio_values: portfolio_value(&returns, self.params.initial_value),
            drawdown_series,
            rolling_volatility,
            return_distribution,
            unavailable: issues,
        };

        tracing::info!(
            skipped = bundle.unavailable.len(),
            "Risk metrics calculated successfully"
        );
        Ok(bundle)
    }
}

/// Daily and annualised VaR at 95% and 99%, historical and parametric.
fn value_at_risk(returns: &ReturnSeries) -> Result<VarReport, AnalyticsError> {
    let daily = VarSet {
        historical_95: statistics::historical_var(returns, CONFIDENCE_95)?,
        historical_99: statistics::historical_var(returns, CONFIDENCE_99)?,
        parametric_95: statistics::parametric_var(returns, CONFIDENCE_95)?,
        parametric_99: statistics::parametric_var(returns, CONFIDENCE_99)?,
    };
    let annual = VarSet {
        historical_95: annualize_var(daily.historical_95),
        historical_99: annualize_var(daily.historical_99),
        parametric_95: annualize_var(daily.parametric_95),
        parametric_99: annualize_var(daily.parametric_99),
    };
    Ok(VarReport { daily, annual })
}

/// Keeps a metric's value, or logs and records why it is missing.
fn record<T>(
    issues: &mut Vec<MetricIssue>,
    metric: &str,
    result: Result<T, AnalyticsError>,
) -> Option<T> {
    match result {
        Ok(value) => {
            tracing::debug!(metric, "Metric computed.");
            Some(value)
        }
        Err(e) => {
            tracing::warn!(
                metric,
                error = %e,
                "Metric unavailable, leaving it out of the bundle."
            );
            issues.push(MetricIssue {
                metric: metric.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}
