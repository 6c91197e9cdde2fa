use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    Core(#[from] CoreError),

    #[error("Not enough data for {metric}: need {required} observations, found {actual}")]
    InsufficientData {
        metric: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Series passed to {0} share no common dates")]
    MisalignedSeries(&'static str),

    #[error("{0} is undefined: division by zero")]
    UndefinedRatio(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}

impl AnalyticsError {
    /// Shorthand used by every statistic that needs a minimum sample size.
    pub(crate) fn require(
        metric: &'static str,
        required: usize,
        actual: usize,
    ) -> Result<(), AnalyticsError> {
        if actual < required {
            return Err(AnalyticsError::InsufficientData {
                metric,
                required,
                actual,
            });
        }
        Ok(())
    }
}
