//! Weather source adapters
//!
//! Every adapter turns one upstream service into a [`NormalizedObservation`]:
//! - [`metar::MetarSource`]: current station observations (aviationweather.gov METAR)
//! - [`taf::TafSource`]: terminal aerodrome forecasts (aviationweather.gov TAF)
//! - [`nws::GriddedForecastSource`]: NWS gridded hourly forecasts (api.weather.gov)
//!
//! Units are normalized inside the adapter; nothing in knots or meters leaves this module.

use async_trait::async_trait;

use crate::Result;
use crate::models::{FlightQuery, NormalizedObservation, SourceTier};
use crate::stations::NearestStations;

pub mod aviation;
pub mod client;
pub mod metar;
pub mod nws;
pub mod taf;
pub mod wx;

pub use client::SourceClient;
pub use metar::MetarSource;
pub use nws::GriddedForecastSource;
pub use taf::TafSource;

/// One tier of the weather cascade
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// The tier this source serves
    fn tier(&self) -> SourceTier;

    /// Fetch and normalize data for the query.
    ///
    /// Any network, parse or selection problem is returned as
    /// [`crate::WeatherCheckError::SourceUnavailable`]; it must never panic.
    async fn fetch(
        &self,
        query: &FlightQuery,
        stations: &NearestStations,
    ) -> Result<NormalizedObservation>;
}
