//! `uas-weather-check` - weather Go/No-Go decisions for uncrewed aircraft operations
//!
//! Resolves a location, picks the freshest usable weather source for the planned flight
//! time (METAR, TAF or NWS gridded forecast), normalizes it and evaluates fixed
//! operating limits together with daylight.

pub mod api;
pub mod cache;
pub mod cascade;
pub mod config;
pub mod daylight;
pub mod error;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod rules;
pub mod service;
pub mod stations;
pub mod units;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::ForecastCache;
pub use cascade::{Cascade, CascadeOutcome, TierWindows};
pub use config::WeatherCheckConfig;
pub use daylight::{DaylightProvider, DaylightStatus, DaylightWindow};
pub use error::WeatherCheckError;
pub use models::{
    Ceiling, Coordinates, FlightQuery, ForecastSegment, NormalizedObservation, SourceTier,
};
pub use resolver::{CoordinateInput, CoordinateResolver};
pub use rules::{Decision, EvaluationResult};
pub use service::{CheckRequest, FlightCheckReport, ForecastRow, WeatherCheckService};
pub use stations::{NearestStations, ReferenceTables, StationLocator};
pub use weather::WeatherSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherCheckError>;
