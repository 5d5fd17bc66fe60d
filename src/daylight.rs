//! Sunrise/sunset lookup and daylight classification
//!
//! Two providers are available: the sunrise-sunset.org API and a local solar
//! computation. A failed lookup is not an error for the request; the window is simply
//! unknown and the daylight rule passes unchecked.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::error::WeatherCheckError;
use crate::models::Coordinates;
use crate::weather::SourceClient;

/// Sunrise and sunset instants for one date at one place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaylightWindow {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl DaylightWindow {
    pub fn new(sunrise: DateTime<Utc>, sunset: DateTime<Utc>) -> Result<Self> {
        if sunset <= sunrise {
            return Err(WeatherCheckError::daylight(format!(
                "sunset {sunset} is not after sunrise {sunrise}"
            )));
        }
        Ok(Self { sunrise, sunset })
    }
}

/// Where the flight time falls relative to the daylight window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DaylightStatus {
    Unknown,
    Before { minutes_until_sunrise: i64 },
    After { minutes_since_sunset: i64 },
    Within { minutes_until_sunset: i64 },
}

impl DaylightStatus {
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Unknown passes; only a known before/after fails
    #[must_use]
    pub fn permits_flight(&self) -> bool {
        matches!(self, Self::Unknown | Self::Within { .. })
    }

    /// `"3 hours 25 minutes"` of daylight left, when within the window
    #[must_use]
    pub fn remaining_daylight(&self) -> Option<String> {
        match self {
            Self::Within {
                minutes_until_sunset,
            } => Some(format!(
                "{} hours {} minutes",
                minutes_until_sunset / 60,
                minutes_until_sunset % 60
            )),
            _ => None,
        }
    }
}

/// Classify `at` against `window`; no window means unknown
#[must_use]
pub fn classify(window: Option<&DaylightWindow>, at: DateTime<Utc>) -> DaylightStatus {
    let Some(window) = window else {
        return DaylightStatus::Unknown;
    };

    if at < window.sunrise {
        DaylightStatus::Before {
            minutes_until_sunrise: (window.sunrise - at).num_minutes(),
        }
    } else if at > window.sunset {
        DaylightStatus::After {
            minutes_since_sunset: (at - window.sunset).num_minutes(),
        }
    } else {
        DaylightStatus::Within {
            minutes_until_sunset: (window.sunset - at).num_minutes(),
        }
    }
}

#[async_trait]
pub trait DaylightProvider: Send + Sync {
    async fn window(&self, coordinates: &Coordinates, date: NaiveDate) -> Result<DaylightWindow>;
}

/// Look up the window, logging a failure and returning `None` in its place
pub async fn lookup(
    provider: &dyn DaylightProvider,
    coordinates: &Coordinates,
    date: NaiveDate,
) -> Option<DaylightWindow> {
    match provider.window(coordinates, date).await {
        Ok(window) => Some(window),
        Err(e) => {
            warn!("{}; daylight will not be checked", e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct SunriseSunsetResponse {
    status: String,
    results: Option<SunriseSunsetResults>,
}

#[derive(Debug, Deserialize)]
struct SunriseSunsetResults {
    sunrise: String,
    sunset: String,
}

fn parse_utc(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WeatherCheckError::daylight(format!("unreadable {field} '{raw}': {e}")))
}

/// Parse a `formatted=0` response from api.sunrise-sunset.org
pub fn parse_sunrise_sunset(json: &str) -> Result<DaylightWindow> {
    let response: SunriseSunsetResponse = serde_json::from_str(json)
        .map_err(|e| WeatherCheckError::daylight(format!("unreadable daylight response: {e}")))?;

    if response.status != "OK" {
        return Err(WeatherCheckError::daylight(format!(
            "daylight service returned status {}",
            response.status
        )));
    }
    let results = response
        .results
        .ok_or_else(|| WeatherCheckError::daylight("daylight response has no results"))?;

    DaylightWindow::new(
        parse_utc("sunrise", &results.sunrise)?,
        parse_utc("sunset", &results.sunset)?,
    )
}

/// api.sunrise-sunset.org client
pub struct SunriseSunsetClient {
    client: SourceClient,
    base_url: String,
}

impl SunriseSunsetClient {
    pub fn new(client: SourceClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DaylightProvider for SunriseSunsetClient {
    #[instrument(name = "daylight_fetch", skip(self))]
    async fn window(&self, coordinates: &Coordinates, date: NaiveDate) -> Result<DaylightWindow> {
        let url = format!(
            "{}?lat={}&lng={}&date={}&formatted=0",
            self.base_url,
            coordinates.latitude(),
            coordinates.longitude(),
            date.format("%Y-%m-%d")
        );

        let body = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| WeatherCheckError::daylight(format!("{e:#}")))?;
        parse_sunrise_sunset(&body)
    }
}

/// Local solar computation, no network
pub struct SolarCalculator;

#[async_trait]
impl DaylightProvider for SolarCalculator {
    async fn window(&self, coordinates: &Coordinates, date: NaiveDate) -> Result<DaylightWindow> {
        let position = sunrise::Coordinates::new(coordinates.latitude(), coordinates.longitude())
            .ok_or_else(|| {
                WeatherCheckError::daylight(format!(
                    "invalid coordinates for solar computation: {}",
                    coordinates.format_coordinates()
                ))
            })?;

        let solar_day = sunrise::SolarDay::new(position, date);
        let sunrise = solar_day.event_time(sunrise::SolarEvent::Sunrise);
        let sunset = solar_day.event_time(sunrise::SolarEvent::Sunset);

        match (sunrise, sunset) {
            (Some(sunrise), Some(sunset)) => {
                debug!("Computed sunrise {} and sunset {}", sunrise, sunset);
                DaylightWindow::new(sunrise, sunset)
            }
            _ => Err(WeatherCheckError::daylight(format!(
                "no sunrise or sunset on {date} (polar day or night)"
            ))),
        }
    }
}
