//! End-to-end scenarios for the metrics bundle.
//!
//! The four-day A/B portfolio: A = [100, 105, 99, 108], B = [50, 51, 50, 53],
//! weights 60/40. Daily portfolio returns are
//!   r1 = 0.6 * 0.05           + 0.4 * 0.02
//!   r2 = 0.6 * (-6 / 105)     + 0.4 * (-1 / 51)
//!   r3 = 0.6 * (9 / 99)       + 0.4 * (3 / 50)

use analytics::returns::{portfolio_returns, portfolio_value};
use analytics::statistics::{
    historical_var, max_drawdown, parametric_var, rolling_volatility, sample_std, volatility,
};
use analytics::{AnalyticsEngine, AnalyticsError, correlation_matrix};
use approx::assert_relative_eq;
use chrono::NaiveDate;
use configuration::MetricsParams;
use core_types::{PriceMatrix, TimeSeries, WeightVector};

fn days(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    (0..n as u64).map(|i| start + chrono::Days::new(i)).collect()
}

fn ab_prices() -> PriceMatrix {
    PriceMatrix::new(
        days(4),
        vec![
            ("A".to_string(), vec![100.0, 105.0, 99.0, 108.0]),
            ("B".to_string(), vec![50.0, 51.0, 50.0, 53.0]),
        ],
    )
    .unwrap()
}

fn ab_weights() -> WeightVector {
    WeightVector::new([("A", 60.0), ("B", 40.0)]).unwrap()
}

fn expected_returns() -> [f64; 3] {
    [
        0.6 * 0.05 + 0.4 * 0.02,
        0.6 * (-6.0 / 105.0) + 0.4 * (-1.0 / 51.0),
        0.6 * (9.0 / 99.0) + 0.4 * (3.0 / 50.0),
    ]
}

#[test]
fn four_day_portfolio_returns() {
    let returns = portfolio_returns(&ab_prices(), &ab_weights()).unwrap();
    assert_eq!(returns.len(), 3);
    for (got, want) in returns.values().iter().zip(expected_returns()) {
        assert_relative_eq!(*got, want, max_relative = 1e-12);
    }
}

#[test]
fn four_day_daily_volatility_is_sample_std() {
    let returns = portfolio_returns(&ab_prices(), &ab_weights()).unwrap();
    let expected = sample_std(&expected_returns()).unwrap();
    assert_relative_eq!(volatility(&returns, false).unwrap(), expected, max_relative = 1e-12);
}

#[test]
fn four_day_drawdown_reflects_day_three_dip() {
    let returns = portfolio_returns(&ab_prices(), &ab_weights()).unwrap();
    let dd = max_drawdown(&returns).unwrap();
    let [r1, r2, _] = expected_returns();

    let peak = 1.0 + r1;
    let trough = peak * (1.0 + r2);
    let values = dd.drawdown_series.values();
    assert_eq!(values[0], 0.0);
    assert_relative_eq!(values[1], (trough - peak) / peak, max_relative = 1e-12);
    assert_eq!(values[2], 0.0);
    assert_relative_eq!(dd.max_drawdown, -r2, max_relative = 1e-9);
}

#[test]
fn full_bundle_for_four_day_portfolio() {
    let engine = AnalyticsEngine::new(MetricsParams {
        rolling_window: 2,
        histogram_bins: 4,
        initial_value: 100.0,
        ..MetricsParams::default()
    });
    let benchmark = TimeSeries::from_parts(days(4), vec![400.0, 404.0, 398.0, 410.0]).unwrap();

    let bundle = engine
        .calculate(&ab_prices(), &ab_weights(), Some(&benchmark))
        .unwrap();

    assert!(bundle.unavailable.is_empty(), "{:?}", bundle.unavailable);
    assert_eq!(bundle.observations, 3);
    assert_eq!(bundle.portfolio_values.len(), 3);
    assert_eq!(bundle.drawdown_series.as_ref().unwrap().len(), 3);
    assert_eq!(bundle.rolling_volatility.as_ref().unwrap().len(), 2);

    let bins = bundle.return_distribution.as_ref().unwrap();
    assert_eq!(bins.len(), 4);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);

    let var = bundle.var.unwrap();
    assert_relative_eq!(
        var.annual.historical_95,
        var.daily.historical_95 * 252f64.sqrt(),
        max_relative = 1e-12
    );
    assert!(var.daily.historical_99 >= var.daily.historical_95);
    assert!(var.daily.parametric_99 > var.daily.parametric_95);

    let values = portfolio_value(
        &portfolio_returns(&ab_prices(), &ab_weights()).unwrap(),
        100.0,
    );
    assert_eq!(bundle.portfolio_values, values);

    let corr = bundle.correlation_matrix.as_ref().unwrap();
    assert_eq!(corr.get("A", "A"), Some(1.0));
    assert_eq!(corr.get("A", "B"), corr.get("B", "A"));
    assert!(bundle.beta.is_some());
}

#[test]
fn bundle_serializes_with_nested_var_records() {
    let bundle = AnalyticsEngine::default()
        .calculate(&ab_prices(), &ab_weights(), None)
        .unwrap();
    let json = serde_json::to_value(&bundle).unwrap();
    assert!(json["var"]["daily"]["historical_95"].is_number());
    assert!(json["var"]["annual"]["parametric_99"].is_number());
    assert!(json["beta"].is_null());
    assert_eq!(json["correlation_matrix"]["B"]["B"], 1.0);
    assert_eq!(json["portfolio_values"][0]["date"], "2024-04-02");
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let m = correlation_matrix(&ab_prices()).unwrap();
    assert_relative_eq!(m.get("A", "B").unwrap(), m.get("B", "A").unwrap(), epsilon = 1e-9);
    assert_eq!(m.get("A", "A"), Some(1.0));
    assert_eq!(m.get("B", "B"), Some(1.0));
}

#[test]
fn degenerate_matrices_raise_insufficient_data() {
    let weights = WeightVector::new([("A", 100.0)]).unwrap();
    let empty = PriceMatrix::new(vec![], vec![("A".to_string(), vec![])]).unwrap();
    let single = PriceMatrix::new(days(1), vec![("A".to_string(), vec![10.0])]).unwrap();

    for prices in [&empty, &single] {
        assert!(matches!(
            portfolio_returns(prices, &weights),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert!(matches!(
            correlation_matrix(prices),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert!(matches!(
            AnalyticsEngine::default().calculate(prices, &weights, None),
            Err(AnalyticsError::InsufficientData { .. })
        ));
    }

    let no_returns = TimeSeries::new();
    let one_return = TimeSeries::from_parts(days(1), vec![0.01]).unwrap();
    for returns in [&no_returns, &one_return] {
        assert!(matches!(
            volatility(returns, true),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert!(matches!(
            historical_var(returns, 0.95),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert!(matches!(
            parametric_var(returns, 0.99),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert_eq!(portfolio_value(returns, 100.0).len(), returns.len());
        assert!(rolling_volatility(returns, 30).unwrap().is_empty());
    }
}
