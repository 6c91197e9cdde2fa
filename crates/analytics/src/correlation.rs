use crate::error::AnalyticsError;
use crate::returns::asset_returns;
use crate::statistics::pearson;
use core_types::PriceMatrix;
use serde::Serialize;
use std::collections::BTreeMap;

/// Pairwise Pearson correlation of asset returns.
///
/// `None` marks a pair involving an asset whose returns have zero variance, for
/// which the coefficient is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrelationMatrix {
    values: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.values.get(a).and_then(|row| row.get(b)).copied().flatten()
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn row(&self, asset: &str) -> Option<&BTreeMap<String, Option<f64>>> {
        self.values.get(asset)
    }
}

/// Correlation matrix of the simple returns of every asset in `prices`.
///
/// Independent of portfolio weights. Diagonal entries are exactly 1.0 and
/// `corr(a, b)` is computed once and mirrored to `corr(b, a)`.
pub fn correlation_matrix(prices: &PriceMatrix) -> Result<CorrelationMatrix, AnalyticsError> {
    AnalyticsError::require("correlation matrix", 1, prices.assets().len())?;
    AnalyticsError::require("correlation matrix", 2, prices.len().saturating_sub(1))?;

    let returns: Vec<(&str, Vec<f64>)> = prices
        .columns()
        .map(|(asset, column)| (asset, asset_returns(column)))
        .collect();

    let mut values: BTreeMap<String, BTreeMap<String, Option<f64>>> = BTreeMap::new();
    for (i, (a, ra)) in returns.iter().enumerate() {
        for (b, rb) in returns.iter().skip(i) {
            let coefficient = if a == b {
                pearson(ra, rb).map(|_| 1.0)
            } else {
                pearson(ra, rb)
            };
            values
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string(), coefficient);
            values
                .entry(b.to_string())
                .or_default()
                .insert(a.to_string(), coefficient);
        }
    }

    Ok(CorrelationMatrix { values })
}
