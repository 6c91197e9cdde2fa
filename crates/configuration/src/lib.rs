use crate::error::ConfigError;
use core_types::validate_catalogue;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, MetricsParams, Output, OutputFormat, StressParams, default_crisis_periods,
};

/// Prefix of environment variables that override file settings,
/// e.g. `RISKDASH_METRICS__RISK_FREE_RATE=0.03`.
pub const ENV_PREFIX: &str = "RISKDASH";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the optional TOML file at `path`,
/// then `RISKDASH_*` environment variables. The merged result is validated before
/// it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    } else {
        builder = builder.add_source(config::File::with_name("config").required(false));
    }

    let builder = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        crisis_periods = config.stress.crisis_periods.len(),
        "Configuration loaded."
    );
    Ok(config)
}

impl Config {
    /// Checks the cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()?;
        self.stress.validate()
    }
}

impl MetricsParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "metrics.risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.rolling_window < 2 {
            return Err(ConfigError::ValidationError(
                "metrics.rolling_window must be at least 2".to_string(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::ValidationError(
                "metrics.histogram_bins must be at least 1".to_string(),
            ));
        }
        if !(self.initial_value.is_finite() && self.initial_value > 0.0) {
            return Err(ConfigError::ValidationError(
                "metrics.initial_value must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl StressParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_value.is_finite() && self.base_value > 0.0) {
            return Err(ConfigError::ValidationError(
                "stress.base_value must be positive".to_string(),
            ));
        }

        validate_catalogue(&self.crisis_periods)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
