use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Key of the whole-history worst day in stress results; no period may use it as its id.
pub const WORST_DAY_KEY: &str = "worst_day_overall";

/// A named historical date range used to stress a portfolio.
///
/// Crisis periods are configuration data. The stress tester receives them as an
/// ordered table and never refers to a specific period by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisPeriod {
    /// Stable key used in result mappings (e.g. `covid_crash`).
    pub id: String,
    /// Human readable name (e.g. "COVID-19 Market Crash").
    pub name: String,
    /// First calendar day of the window, inclusive.
    pub start_date: NaiveDate,
    /// Last calendar day of the window, inclusive.
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl CrisisPeriod {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            description: description.into(),
        }
    }
}

/// Checks a crisis catalogue before it is run.
///
/// Every period must end on or after its start, and ids must be unique and must not
/// collide with `WORST_DAY_KEY`, since all of them share one result mapping.
pub fn validate_catalogue(periods: &[CrisisPeriod]) -> Result<(), CoreError> {
    let mut ids = HashSet::new();
    for period in periods {
        if period.start_date > period.end_date {
            return Err(CoreError::InvalidCatalogue(format!(
                "crisis period '{}' ends ({}) before it starts ({})",
                period.id, period.end_date, period.start_date
            )));
        }
        if period.id == WORST_DAY_KEY {
            return Err(CoreError::InvalidCatalogue(format!(
                "'{WORST_DAY_KEY}' is reserved and cannot be used as a crisis period id"
            )));
        }
        if !ids.insert(period.id.as_str()) {
            return Err(CoreError::InvalidCatalogue(format!(
                "crisis period id '{}' is defined more than once",
                period.id
            )));
        }
    }
    Ok(())
}
