//! # Portfolio Analytics Engine
//!
//! This crate turns a price history and a weight vector into portfolio returns and
//! the risk statistics computed from them.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` and `configuration` (Layer 0).
//! - **Stateless Calculation:** Every statistic is a pure function of its inputs. The
//!   `AnalyticsEngine` composes them into a `MetricsBundle` without holding any state
//!   beyond its parameters.
//!
//! ## Public API
//!
//! - `returns`: portfolio returns, compounded and normalised value series.
//! - `statistics`: volatility, VaR, Sharpe, drawdown, rolling volatility, histogram, beta.
//! - `correlation`: the pairwise correlation matrix of asset returns.
//! - `AnalyticsEngine` / `MetricsBundle`: the aggregate calculation and its output.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod correlation;
pub mod engine;
pub mod error;
pub mod report;
pub mod returns;
pub mod statistics;

// Re-export the key components to create a clean, public-facing API.
pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use engine::{AnalyticsEngine, CONFIDENCE_95, CONFIDENCE_99};
pub use error::AnalyticsError;
pub use report::{MetricIssue, MetricsBundle, VarReport, VarSet};
pub use statistics::{Drawdown, HistogramBin, TRADING_DAYS_PER_YEAR};
