use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Weight given for asset '{0}' which is not present in the price matrix")]
    UnknownAsset(String),

    #[error("Missing price for asset '{asset}' on {date}")]
    MissingPrice { asset: String, date: NaiveDate },

    #[error("Invalid price {price} for '{asset}' on {date}: must be finite and positive")]
    InvalidPrice {
        asset: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("Dates must be strictly increasing, found {previous} followed by {next}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("Shape mismatch for '{name}': expected {expected} values, found {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Asset '{0}' appears more than once")]
    DuplicateAsset(String),

    #[error("Invalid crisis catalogue: {0}")]
    InvalidCatalogue(String),
}
