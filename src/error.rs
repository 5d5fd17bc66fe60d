//! Error types and handling for the weather check service

use thiserror::Error;

use crate::models::SourceTier;

/// Main error type for the weather check service
#[derive(Error, Debug)]
pub enum WeatherCheckError {
    /// Bad coordinates or a malformed date/time, rejected before any network call
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A single weather source failed or returned unusable data
    #[error("{tier} source unavailable: {message}")]
    SourceUnavailable { tier: SourceTier, message: String },

    /// Every eligible weather source failed
    #[error("All weather sources unavailable")]
    AllSourcesUnavailable,

    /// Sunrise/sunset could not be determined
    #[error("Daylight unavailable: {message}")]
    DaylightUnavailable { message: String },

    /// A static reference table could not be loaded
    #[error("Reference data missing for {table}: {message}")]
    ReferenceDataMissing { table: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherCheckError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new source error for the given tier
    pub fn source_unavailable<S: Into<String>>(tier: SourceTier, message: S) -> Self {
        Self::SourceUnavailable {
            tier,
            message: message.into(),
        }
    }

    /// Create a new daylight error
    pub fn daylight<S: Into<String>>(message: S) -> Self {
        Self::DaylightUnavailable {
            message: message.into(),
        }
    }

    /// Create a new reference data error
    pub fn reference_missing<T: Into<String>, S: Into<String>>(table: T, message: S) -> Self {
        Self::ReferenceDataMissing {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { message } => format!("Invalid input: {message}"),
            Self::SourceUnavailable { tier, .. } => {
                format!("The {tier} weather source could not be reached.")
            }
            Self::AllSourcesUnavailable => {
                "No weather source could be reached. Conservative defaults were used.".to_string()
            }
            Self::DaylightUnavailable { .. } => {
                "Sunrise and sunset could not be determined; daylight was not checked.".to_string()
            }
            Self::ReferenceDataMissing { table, .. } => {
                format!("Station reference table '{table}' is unavailable.")
            }
            Self::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}
