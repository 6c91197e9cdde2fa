//! # Core Types
//!
//! The Layer 0 data model shared by every other crate in the workspace: the price
//! matrix a computation starts from, the weight vector applied to it, the dated
//! series every statistic produces, and the crisis-period records the stress tester
//! iterates over.
//!
//! Everything here is immutable once constructed. Constructors validate their
//! invariants and return a `CoreError` instead of building a half-valid value.

pub mod crisis;
pub mod error;
pub mod prices;
pub mod series;
pub mod weights;

// Re-export the core types to provide a clean public API.
pub use crisis::{CrisisPeriod, WORST_DAY_KEY, validate_catalogue};
pub use error::CoreError;
pub use prices::PriceMatrix;
pub use series::{PortfolioValueSeries, ReturnSeries, SeriesPoint, TimeSeries};
pub use weights::{WEIGHT_SUM_TARGET, WEIGHT_SUM_TOLERANCE, WeightVector};
