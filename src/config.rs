//! Configuration management for the weather check service
//!
//! Handles loading configuration from a TOML file and `UASWX__SECTION__KEY`
//! environment variables, and validates every setting.

use crate::WeatherCheckError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the weather check service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherCheckConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Upstream weather and daylight services
    pub sources: SourcesConfig,
    /// Look-ahead windows for the source tiers
    pub cascade: CascadeConfig,
    /// Gridded forecast cache
    pub cache: CacheConfig,
    /// Reference table locations
    pub reference: ReferenceConfig,
    /// Daylight provider selection
    pub daylight: DaylightConfig,
    /// Local time handling
    pub display: DisplayConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// aviationweather.gov METAR endpoint
    #[serde(default = "default_metar_url")]
    pub metar_url: String,
    /// aviationweather.gov TAF endpoint
    #[serde(default = "default_taf_url")]
    pub taf_url: String,
    /// api.weather.gov base URL
    #[serde(default = "default_nws_url")]
    pub nws_url: String,
    /// api.sunrise-sunset.org endpoint
    #[serde(default = "default_daylight_url")]
    pub daylight_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// api.weather.gov rejects requests without a user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Flights at most this far ahead try the current observation first
    #[serde(default = "default_current_max_hours")]
    pub current_max_hours: u32,
    /// Flights at most this far ahead try the short-range forecast
    #[serde(default = "default_short_range_max_hours")]
    pub short_range_max_hours: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Maximum number of cached grid series
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_sites_path")]
    pub sites_path: String,
    #[serde(default = "default_observation_stations_path")]
    pub observation_stations_path: String,
    #[serde(default = "default_forecast_stations_path")]
    pub forecast_stations_path: String,
    #[serde(default = "default_forecast_offices_path")]
    pub forecast_offices_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaylightSource {
    /// api.sunrise-sunset.org
    #[default]
    Api,
    /// Local computation
    Solar,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaylightConfig {
    #[serde(default)]
    pub source: DaylightSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA zone flight times are entered and shown in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_metar_url() -> String {
    "https://aviationweather.gov/api/data/metar".to_string()
}

fn default_taf_url() -> String {
    "https://aviationweather.gov/api/data/taf".to_string()
}

fn default_nws_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_daylight_url() -> String {
    "https://api.sunrise-sunset.org/json".to_string()
}

fn default_timeout() -> u32 {
    5
}

fn default_user_agent() -> String {
    format!("uas-weather-check/{}", crate::VERSION)
}

fn default_current_max_hours() -> u32 {
    2
}

fn default_short_range_max_hours() -> u32 {
    30
}

fn default_cache_ttl() -> u32 {
    15
}

fn default_cache_max_entries() -> u64 {
    256
}

fn default_sites_path() -> String {
    "data/sites.toml".to_string()
}

fn default_observation_stations_path() -> String {
    "data/observation_stations.toml".to_string()
}

fn default_forecast_stations_path() -> String {
    "data/forecast_stations.toml".to_string()
}

fn default_forecast_offices_path() -> String {
    "data/forecast_offices.toml".to_string()
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            metar_url: default_metar_url(),
            taf_url: default_taf_url(),
            nws_url: default_nws_url(),
            daylight_url: default_daylight_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            current_max_hours: default_current_max_hours(),
            short_range_max_hours: default_short_range_max_hours(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cache_ttl(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            sites_path: default_sites_path(),
            observation_stations_path: default_observation_stations_path(),
            forecast_stations_path: default_forecast_stations_path(),
            forecast_offices_path: default_forecast_offices_path(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DisplayConfig {
    /// The configured zone, parsed
    pub fn tz(&self) -> crate::Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            WeatherCheckError::config(format!("Invalid timezone '{}': {e}", self.timezone))
        })
    }
}

impl WeatherCheckConfig {
    /// Load configuration from `config_path` (or the default locations) and environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Explicit path, then ./config.toml, then the platform config dir
        let config_file = config_path.unwrap_or_else(|| {
            let local = PathBuf::from("config.toml");
            if local.exists() {
                local
            } else {
                Self::get_config_path().unwrap_or(local)
            }
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // UASWX__CACHE__TTL_MINUTES=30 overrides cache.ttl_minutes
        builder = builder.add_source(
            Environment::with_prefix("UASWX")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherCheckConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uas-weather-check").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.sources.metar_url.is_empty() {
            self.sources.metar_url = default_metar_url();
        }
        if self.sources.taf_url.is_empty() {
            self.sources.taf_url = default_taf_url();
        }
        if self.sources.nws_url.is_empty() {
            self.sources.nws_url = default_nws_url();
        }
        if self.sources.daylight_url.is_empty() {
            self.sources.daylight_url = default_daylight_url();
        }
        if self.sources.timeout_seconds == 0 {
            self.sources.timeout_seconds = default_timeout();
        }
        if self.sources.user_agent.is_empty() {
            self.sources.user_agent = default_user_agent();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.max_entries == 0 {
            self.cache.max_entries = default_cache_max_entries();
        }
        if self.display.timezone.is_empty() {
            self.display.timezone = default_timezone();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.sources.timeout_seconds > 60 {
            return Err(WeatherCheckError::config("Source timeout cannot exceed 60 seconds").into());
        }

        if self.cascade.current_max_hours == 0 {
            return Err(
                WeatherCheckError::config("Current observation window must be at least 1 hour")
                    .into(),
            );
        }

        if self.cascade.current_max_hours > self.cascade.short_range_max_hours {
            return Err(WeatherCheckError::config(
                "Current observation window cannot exceed the short-range forecast window",
            )
            .into());
        }

        if self.cache.ttl_minutes > 24 * 60 {
            return Err(WeatherCheckError::config(
                "Cache TTL cannot exceed 1440 minutes (1 day)",
            )
            .into());
        }

        if self.cache.max_entries > 100_000 {
            return Err(WeatherCheckError::config("Cache max entries cannot exceed 100000").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherCheckError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherCheckError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("METAR", &self.sources.metar_url),
            ("TAF", &self.sources.taf_url),
            ("NWS", &self.sources.nws_url),
            ("Daylight", &self.sources.daylight_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherCheckError::config(format!(
                    "{name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        self.display.tz()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = WeatherCheckConfig::default();
        assert_eq!(config.sources.timeout_seconds, 5);
        assert_eq!(config.cascade.current_max_hours, 2);
        assert_eq!(config.cascade.short_range_max_hours, 30);
        assert_eq!(config.cache.ttl_minutes, 15);
        assert_eq!(config.daylight.source, DaylightSource::Api);
        assert_eq!(config.display.tz().unwrap(), chrono_tz::America::Chicago);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherCheckConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherCheckConfig::default();
        config.sources.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = WeatherCheckConfig::default();
        config.cascade.current_max_hours = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_timezone_and_urls() {
        let mut config = WeatherCheckConfig::default();
        config.display.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        let mut config = WeatherCheckConfig::default();
        config.sources.nws_url = "api.weather.gov".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("NWS URL"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = WeatherCheckConfig::default();
        config.sources.timeout_seconds = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.sources.timeout_seconds, 5);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[daylight]
source = "solar"

[reference]
sites_path = "/srv/uaswx/sites.toml"
"#
        )
        .unwrap();

        let config = WeatherCheckConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.daylight.source, DaylightSource::Solar);
        assert_eq!(config.reference.sites_path, "/srv/uaswx/sites.toml");
        assert_eq!(config.reference.forecast_offices_path, "data/forecast_offices.toml");
        assert_eq!(config.display.timezone, "America/Chicago");
    }

    #[test]
    fn test_environment_variable_override() {
        // SAFETY: only this test touches UASWX__CASCADE__SHORT_RANGE_MAX_HOURS
        unsafe {
            env::set_var("UASWX__CASCADE__SHORT_RANGE_MAX_HOURS", "24");
        }

        let result =
            WeatherCheckConfig::load_from_path(Some(PathBuf::from("/nonexistent/config.toml")));

        // SAFETY: Test cleanup
        unsafe {
            env::remove_var("UASWX__CASCADE__SHORT_RANGE_MAX_HOURS");
        }

        let config = result.unwrap();
        assert_eq!(config.cascade.short_range_max_hours, 24);
        assert_eq!(config.cascade.current_max_hours, 2);
    }

    #[test]
    fn test_config_path_generation() {
        let path = WeatherCheckConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("uas-weather-check"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
