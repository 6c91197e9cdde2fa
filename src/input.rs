use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use core_types::{PriceMatrix, TimeSeries, WeightVector};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The JSON document the CLI reads its price history from.
///
/// ```json
/// { "dates": ["2024-01-02", "2024-01-03"],
///   "prices": { "AAA": [10.0, 10.5], "BBB": [20.0, null] },
///   "benchmark": { "dates": ["2024-01-02", "2024-01-03"], "prices": [400.0, 402.0] } }
/// ```
#[derive(Debug, Deserialize)]
pub struct PriceFile {
    pub dates: Vec<NaiveDate>,
    pub prices: BTreeMap<String, Vec<Option<f64>>>,
    #[serde(default)]
    pub benchmark: Option<BenchmarkFile>,
}

#[derive(Debug, Deserialize)]
pub struct BenchmarkFile {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
}

/// A validated price matrix plus the optional benchmark series.
#[derive(Debug)]
pub struct MarketData {
    pub prices: PriceMatrix,
    pub benchmark: Option<TimeSeries>,
}

impl PriceFile {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse price file as JSON")
    }

    pub fn into_market_data(self) -> Result<MarketData> {
        let columns = self.prices.into_iter().collect();
        let prices = PriceMatrix::from_sparse(self.dates, columns)
            .context("Price file does not form a valid price matrix")?;
        let benchmark = self
            .benchmark
            .map(|b| TimeSeries::from_prices("benchmark", b.dates, b.prices))
            .transpose()
            .context("Benchmark series is invalid")?;
        Ok(MarketData { prices, benchmark })
    }
}

pub fn load_market_data(path: &Path) -> Result<MarketData> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read price file {}", path.display()))?;
    let data = PriceFile::parse(&json)?.into_market_data()?;
    tracing::info!(
        assets = data.prices.assets().len(),
        days = data.prices.len(),
        benchmark = data.benchmark.is_some(),
        "Loaded price history."
    );
    Ok(data)
}

/// Parses one `ASSET=PCT` command-line weight.
pub fn parse_weight(arg: &str) -> Result<(String, f64), String> {
    let (asset, pct) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected ASSET=PCT, got '{arg}'"))?;
    let asset = asset.trim();
    if asset.is_empty() {
        return Err(format!("missing asset name in '{arg}'"));
    }
    let pct: f64 = pct
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", pct.trim()))?;
    Ok((asset.to_string(), pct))
}

pub fn build_weights(pairs: Vec<(String, f64)>) -> Result<WeightVector> {
    if pairs.is_empty() {
        bail!("at least one --weight ASSET=PCT is required");
    }
    WeightVector::new(pairs).context("Invalid portfolio weights")
}
