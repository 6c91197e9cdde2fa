use crate::error::CoreError;
use chrono::NaiveDate;
use std::collections::HashSet;

/// A trading-day index crossed with one price column per asset.
///
/// Invariants enforced at construction:
/// - dates are strictly increasing (no duplicates),
/// - every column has exactly one price per date,
/// - every price is finite and strictly positive,
/// - asset identifiers are unique.
///
/// Column order is the order the caller supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl PriceMatrix {
    /// Builds a fully populated price matrix.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, CoreError> {
        check_dates(&dates)?;

        let mut seen = HashSet::new();
        let mut assets = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());

        for (asset, prices) in columns {
            if !seen.insert(asset.clone()) {
                return Err(CoreError::DuplicateAsset(asset));
            }
            if prices.len() != dates.len() {
                return Err(CoreError::ShapeMismatch {
                    name: asset,
                    expected: dates.len(),
                    actual: prices.len(),
                });
            }
            for (&date, &price) in dates.iter().zip(&prices) {
                check_price(&asset, date, price)?;
            }
            assets.push(asset);
            values.push(prices);
        }

        Ok(Self {
            dates,
            assets,
            columns: values,
        })
    }

    /// Builds a price matrix from columns that may contain gaps.
    ///
    /// Missing data is not forward-filled or interpolated: the first gap found fails
    /// the whole matrix with `CoreError::MissingPrice`.
    pub fn from_sparse(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, CoreError> {
        let mut dense = Vec::with_capacity(columns.len());
        for (asset, prices) in columns {
            if prices.len() != dates.len() {
                return Err(CoreError::ShapeMismatch {
                    name: asset,
                    expected: dates.len(),
                    actual: prices.len(),
                });
            }
            let mut filled = Vec::with_capacity(prices.len());
            for (idx, price) in prices.into_iter().enumerate() {
                match price {
                    Some(p) => filled.push(p),
                    None => {
                        return Err(CoreError::MissingPrice {
                            asset,
                            date: dates[idx],
                        });
                    }
                }
            }
            dense.push((asset, filled));
        }
        Self::new(dates, dense)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of trading days (rows).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The price column for one asset, aligned with `dates()`.
    pub fn column(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Iterates `(asset, prices)` in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.assets
            .iter()
            .zip(&self.columns)
            .map(|(a, c)| (a.as_str(), c.as_slice()))
    }

    /// Returns the rows whose date falls inside `[start, end]`, both ends inclusive.
    ///
    /// The result may be empty when the window does not overlap the index.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> PriceMatrix {
        let from = self.dates.partition_point(|d| *d < start);
        let to = self.dates.partition_point(|d| *d <= end).max(from);

        Self {
            dates: self.dates[from..to].to_vec(),
            assets: self.assets.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c[from..to].to_vec())
                .collect(),
        }
    }
}

/// Prices must be finite and strictly positive.
pub(crate) fn check_price(asset: &str, date: NaiveDate, price: f64) -> Result<(), CoreError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidPrice {
            asset: asset.to_string(),
            date,
            price,
        })
    }
}

fn check_dates(dates: &[NaiveDate]) -> Result<(), CoreError> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(CoreError::UnorderedDates {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}
