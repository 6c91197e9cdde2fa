//! # Stress Tester
//!
//! Replays a weighted portfolio over a catalogue of historical crisis periods and
//! reports how it behaved in each window, together with the worst single day of the
//! whole price history.
//!
//! The catalogue is injected (usually from `configuration::StressParams`), so the
//! algorithm never depends on any particular calendar period. A period that has no
//! trading days in the supplied prices is skipped with a warning rather than failing
//! the run.
//!
//! With the `parallel` feature, periods are evaluated concurrently on rayon's pool.

pub mod error;
pub mod tester;

pub use error::StressError;
pub use tester::{StressReport, StressResult, StressTester, WorstDay, WorstDayRecord};
