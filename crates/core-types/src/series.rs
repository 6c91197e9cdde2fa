use crate::error::CoreError;
use crate::prices::check_price;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An ordered, strictly increasing sequence of dated values.
///
/// Series are derived data: they are produced by the analytics crates and read by
/// consumers, so the points are private and only exposed through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

/// Simple fractional returns, one entry per trading day after the first.
pub type ReturnSeries = TimeSeries;

/// Cumulative portfolio value compounded from a chosen starting value.
pub type PortfolioValueSeries = TimeSeries;

impl TimeSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from parallel date and value vectors.
    ///
    /// Dates must be strictly increasing and both vectors must have the same length.
    pub fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, CoreError> {
        if dates.len() != values.len() {
            return Err(CoreError::ShapeMismatch {
                name: "series".to_string(),
                expected: dates.len(),
                actual: values.len(),
            });
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::UnorderedDates {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        let points = dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| SeriesPoint { date, value })
            .collect();
        Ok(Self { points })
    }

    /// Builds a price series, such as a benchmark, held to the same rules as the
    /// columns of a `PriceMatrix`: every value finite and strictly positive.
    pub fn from_prices(
        name: &str,
        dates: Vec<NaiveDate>,
        prices: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let series = Self::from_parts(dates, prices)?;
        series.check_prices(name)?;
        Ok(series)
    }

    /// Fails with `CoreError::InvalidPrice` on the first value that is not a valid price.
    pub fn check_prices(&self, name: &str) -> Result<(), CoreError> {
        self.points
            .iter()
            .try_for_each(|p| check_price(name, p.date, p.value))
    }

    /// Builds a series from points the caller already knows to be ordered.
    pub(crate) fn from_points_unchecked(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Looks up the value recorded on an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }
}

impl FromIterator<SeriesPoint> for TimeSeries {
    /// Collects points produced by a transformation over an already-ordered series.
    ///
    /// Callers must preserve the ordering of the source; the analytics crates only
    /// ever map or filter over an existing index.
    fn from_iter<I: IntoIterator<Item = SeriesPoint>>(iter: I) -> Self {
        Self::from_points_unchecked(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn from_parts_rejects_unordered_dates() {
        let err = TimeSeries::from_parts(vec![day(2), day(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::UnorderedDates { .. }));
    }

    #[test]
    fn from_parts_rejects_length_mismatch() {
        let err = TimeSeries::from_parts(vec![day(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn get_finds_exact_dates_only() {
        let series = TimeSeries::from_parts(vec![day(1), day(3)], vec![10.0, 30.0]).unwrap();
        assert_eq!(series.get(day(3)), Some(30.0));
        assert_eq!(series.get(day(2)), None);
    }

    #[test]
    fn price_series_rejects_zero_and_nan() {
        let err = TimeSeries::from_prices("bench", vec![day(1), day(2)], vec![400.0, 0.0])
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidPrice {
                asset: "bench".to_string(),
                date: day(2),
                price: 0.0
            }
        );
        assert!(TimeSeries::from_prices("bench", vec![day(1)], vec![f64::NAN]).is_err());
        assert!(TimeSeries::from_prices("bench", vec![day(1)], vec![401.5]).is_ok());
    }

    #[test]
    fn serializes_as_a_list_of_points() {
        let series = TimeSeries::from_parts(vec![day(1)], vec![1.5]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"date":"2024-01-01","value":1.5}]"#);
    }
}
