//! Gridded-hourly-forecast adapter backed by the NWS API
//! (`/gridpoints/{office}/{x},{y}/forecast/hourly`)
//!
//! The hourly series carries no visibility or ceiling, so best case (10 sm, unlimited) is
//! assumed for both. That is a known precision gap of this tier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{SourceClient, WeatherSource};
use crate::Result;
use crate::cache::ForecastCache;
use crate::error::WeatherCheckError;
use crate::models::{Ceiling, FlightQuery, NormalizedObservation, SourceTier, UNKNOWN_CONDITION};
use crate::stations::{ForecastOffice, NearestStations};
use crate::units;

const TIER: SourceTier = SourceTier::Gridded;

/// Visibility assumed for gridded forecasts
pub const ASSUMED_VISIBILITY_SM: f64 = 10.0;

#[derive(Debug, Deserialize)]
struct ApiForecastResponse {
    properties: ApiForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ApiForecastProperties {
    #[serde(default)]
    periods: Vec<ApiForecast>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiForecast {
    start_time: Option<String>,
    end_time: Option<String>,
    wind_speed: Option<Value>,
    short_forecast: Option<String>,
}

/// One hourly period, already normalized to mph
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPeriod {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub wind_mph: f64,
    pub condition: String,
}

fn parse_instant(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Wind from `"10 mph"`, `"5 to 15 mph"`, `"20 km/h"` or a quantity object
/// such as `{"value": 16.0, "unitCode": "wmoUnit:km_h-1"}`
fn wind_mph(raw: Option<&Value>) -> f64 {
    match raw {
        Some(Value::String(text)) => match units::first_integer(text) {
            Some(speed) if text.contains("km/h") => units::kmh_to_mph(f64::from(speed)),
            Some(speed) => f64::from(speed),
            None => 0.0,
        },
        Some(Value::Object(quantity)) => {
            let value = quantity.get("value").and_then(Value::as_f64).unwrap_or(0.0);
            let unit = quantity
                .get("unitCode")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if unit.ends_with("km_h-1") {
                units::kmh_to_mph(value)
            } else {
                units::round1(value)
            }
        }
        _ => 0.0,
    }
}

/// Parse an hourly forecast document; periods without a readable start time are dropped
pub fn parse_hourly_periods(json: &str) -> Result<Vec<HourlyPeriod>> {
    let response: ApiForecastResponse = serde_json::from_str(json).map_err(|e| {
        WeatherCheckError::source_unavailable(TIER, format!("unreadable hourly forecast: {e}"))
    })?;

    let periods: Vec<HourlyPeriod> = response
        .properties
        .periods
        .into_iter()
        .filter_map(|period| {
            let start = parse_instant(period.start_time.as_deref())?;
            Some(HourlyPeriod {
                start,
                end: parse_instant(period.end_time.as_deref()),
                wind_mph: wind_mph(period.wind_speed.as_ref()),
                condition: period
                    .short_forecast
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
            })
        })
        .collect();

    if periods.is_empty() {
        return Err(WeatherCheckError::source_unavailable(
            TIER,
            "hourly forecast contained no usable periods",
        ));
    }
    Ok(periods)
}

/// Period whose start is closest to `at`; ties keep the earlier period
#[must_use]
pub fn closest_period(periods: &[HourlyPeriod], at: DateTime<Utc>) -> Option<&HourlyPeriod> {
    periods
        .iter()
        .min_by_key(|period| (period.start - at).num_seconds().unsigned_abs())
}

fn normalize(period: &HourlyPeriod, office: &str) -> NormalizedObservation {
    NormalizedObservation {
        source: TIER,
        reported_by: Some(office.to_string()),
        wind_mph: period.wind_mph,
        visibility_sm: ASSUMED_VISIBILITY_SM,
        ceiling: Ceiling::Unlimited,
        condition: period.condition.clone(),
        valid_from: Some(period.start),
        valid_to: period.end,
        raw_text: None,
        segments: Vec::new(),
    }
}

/// Hourly forecast for the nearest (or pinned) forecast office grid
pub struct GriddedForecastSource {
    client: SourceClient,
    base_url: String,
    cache: ForecastCache,
}

impl GriddedForecastSource {
    pub fn new(client: SourceClient, base_url: impl Into<String>, cache: ForecastCache) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache,
        }
    }

    async fn load_periods(&self, office: &ForecastOffice) -> Result<Arc<Vec<HourlyPeriod>>> {
        if let Some(periods) = self.cache.get(office).await {
            return Ok(periods);
        }

        let url = format!(
            "{}/gridpoints/{}/{},{}/forecast/hourly",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&office.office),
            office.grid_x,
            office.grid_y
        );
        debug!("Requesting hourly forecast for {}", office.grid_label());

        let body = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| WeatherCheckError::source_unavailable(TIER, format!("{e:#}")))?;
        let periods = Arc::new(parse_hourly_periods(&body)?);
        self.cache.put(office, Arc::clone(&periods)).await;
        Ok(periods)
    }
}

#[async_trait]
impl WeatherSource for GriddedForecastSource {
    fn tier(&self) -> SourceTier {
        TIER
    }

    #[instrument(name = "gridded_fetch", skip_all, fields(flight_time = %query.flight_time))]
    async fn fetch(
        &self,
        query: &FlightQuery,
        stations: &NearestStations,
    ) -> Result<NormalizedObservation> {
        let office = stations.office.as_ref().ok_or_else(|| {
            WeatherCheckError::source_unavailable(TIER, "no forecast office available")
        })?;

        let periods = self.load_periods(office).await?;
        let period = closest_period(&periods, query.flight_time).ok_or_else(|| {
            WeatherCheckError::source_unavailable(TIER, "hourly forecast is empty")
        })?;

        Ok(normalize(period, &office.grid_label()))
    }
}
