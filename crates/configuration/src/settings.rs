use chrono::NaiveDate;
use core_types::CrisisPeriod;
use serde::{Deserialize, Serialize};

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsParams,
    #[serde(default)]
    pub stress: StressParams,
    #[serde(default)]
    pub output: Output,
}

/// Tunable parameters of the metrics bundle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsParams {
    /// Annual risk-free rate used by the Sharpe ratio (0.04 = 4%).
    pub risk_free_rate: f64,
    /// Trailing window, in trading days, of the rolling volatility series.
    pub rolling_window: usize,
    /// Number of equal-width bins of the return distribution.
    pub histogram_bins: usize,
    /// Starting value of the compounded portfolio value chart.
    pub initial_value: f64,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.04,
            rolling_window: 30,
            histogram_bins: 50,
            initial_value: 100_000.0,
        }
    }
}

/// Parameters of the stress tester, including the crisis catalogue.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StressParams {
    /// Every asset is rebased to this value at the start of a stress window.
    pub base_value: f64,
    /// Ordered crisis-period catalogue.
    pub crisis_periods: Vec<CrisisPeriod>,
}

impl Default for StressParams {
    fn default() -> Self {
        Self {
            base_value: 100.0,
            crisis_periods: default_crisis_periods(),
        }
    }
}

/// How the CLI renders results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
}

/// The built-in catalogue: the COVID-19 crash and the 2022 downturn.
pub fn default_crisis_periods() -> Vec<CrisisPeriod> {
    vec![
        CrisisPeriod::new(
            "covid_crash",
            "COVID-19 Market Crash",
            COVID_CRASH_START,
            COVID_CRASH_END,
            "Market crash during COVID-19 pandemic onset",
        ),
        CrisisPeriod::new(
            "2022_downturn",
            "2022 Market Downturn",
            DOWNTURN_2022_START,
            DOWNTURN_2022_END,
            "Market decline due to inflation and rate hikes",
        ),
    ]
}

const COVID_CRASH_START: NaiveDate = date(2020, 2, 20);
const COVID_CRASH_END: NaiveDate = date(2020, 3, 23);
const DOWNTURN_2022_START: NaiveDate = date(2022, 1, 1);
const DOWNTURN_2022_END: NaiveDate = date(2022, 10, 12);

/// Evaluated in const context only, so an impossible date fails the build.
const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date in the default crisis catalogue"),
    }
}
