//! Flight query: where and when the operator wants to fly

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::Coordinates;
use crate::Result;
use crate::error::WeatherCheckError;

/// Immutable per-request query
#[derive(Debug, Clone, Serialize)]
pub struct FlightQuery {
    pub coordinates: Coordinates,
    /// Requested flight time in UTC
    pub flight_time: DateTime<Utc>,
    /// Calendar date at the location, used for the daylight lookup
    pub local_date: NaiveDate,
    /// Local time as entered, e.g. `05/01/2025 at 02:30 PM CDT`
    pub local_display: String,
}

impl FlightQuery {
    /// Build a query from local date (`YYYY-MM-DD`) and time (`HH:MM`) strings in `tz`
    pub fn from_local(coordinates: Coordinates, date: &str, time: &str, tz: Tz) -> Result<Self> {
        let local_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            WeatherCheckError::invalid_input(format!("flight date '{date}' is not YYYY-MM-DD: {e}"))
        })?;
        let local_time = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|e| {
            WeatherCheckError::invalid_input(format!("flight time '{time}' is not HH:MM: {e}"))
        })?;
        let naive = NaiveDateTime::new(local_date, local_time);

        let local = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                return Err(WeatherCheckError::invalid_input(format!(
                    "{naive} does not exist in time zone {tz}"
                )));
            }
        };

        Ok(Self {
            coordinates,
            flight_time: local.with_timezone(&Utc),
            local_date,
            local_display: local.format("%m/%d/%Y at %I:%M %p %Z").to_string(),
        })
    }

    /// Build a query directly from a UTC instant
    #[must_use]
    pub fn at_utc(coordinates: Coordinates, flight_time: DateTime<Utc>, tz: Tz) -> Self {
        let local = flight_time.with_timezone(&tz);
        Self {
            coordinates,
            flight_time,
            local_date: local.date_naive(),
            local_display: local.format("%m/%d/%Y at %I:%M %p %Z").to_string(),
        }
    }
}
