//! Logging setup
//!
//! Console output only, either human-readable or one JSON object per line.
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::Result;
use crate::config::LoggingConfig;
use crate::error::WeatherCheckError;

/// Filter from `RUST_LOG`, else the configured level for this crate and `warn` for dependencies
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,uas_weather_check={}", config.level))
    })
}

/// Install the global subscriber; fails if one is already set
pub fn init(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let installed = if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    installed.map_err(|e| WeatherCheckError::config(format!("Failed to initialize logging: {e}")))
}
