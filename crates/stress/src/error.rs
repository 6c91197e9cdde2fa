use analytics::AnalyticsError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StressError {
    #[error("Invalid input: {0}")]
    Core(#[from] CoreError),

    #[error("Stress calculation failed: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Base value must be finite and positive, got {0}")]
    InvalidBaseValue(f64),
}
