//! End-to-end flight check
//!
//! Resolves the location, finds the stations, runs the source cascade and the daylight
//! lookup side by side, then evaluates the rules and assembles a report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::Result;
use crate::cache::ForecastCache;
use crate::cascade::{Cascade, TierAttempt, TierWindows};
use crate::config::{DaylightSource, WeatherCheckConfig};
use crate::daylight::{self, DaylightProvider, DaylightStatus, SolarCalculator, SunriseSunsetClient};
use crate::models::{Coordinates, FlightQuery, NormalizedObservation};
use crate::resolver::{CoordinateInput, CoordinateResolver};
use crate::rules::{self, EvaluationResult};
use crate::stations::{NearestStations, ReferenceTables, SiteReference, StationLocator};
use crate::weather::{GriddedForecastSource, MetarSource, SourceClient, TafSource};

/// What the operator submits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub location: CoordinateInput,
    /// Local date, `YYYY-MM-DD`
    pub date: String,
    /// Local time, `HH:MM`
    pub time: String,
}

/// One forecast group rendered in local time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    /// e.g. `05/01 01:00 PM CDT`
    pub from: String,
    pub to: String,
    pub wind: String,
    pub visibility: String,
    pub ceiling: String,
    pub clouds: String,
    pub condition: String,
    /// The group that covers the flight time
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightCheckReport {
    pub location: String,
    pub site_id: Option<String>,
    pub coordinates: Coordinates,
    pub coordinates_dms: String,
    /// e.g. `05/01/2025 at 02:30 PM CDT`
    pub local_time: String,
    pub flight_time_utc: DateTime<Utc>,
    pub stations: NearestStations,
    pub observation: NormalizedObservation,
    pub wind: String,
    pub visibility: String,
    pub ceiling: String,
    /// Ceiling in feet with unlimited reported as 10000
    pub ceiling_ft: u32,
    /// METAR or TAF text as issued, when the winning source has one
    pub raw_text: Option<String>,
    /// Every TAF group, empty unless the short-range forecast was used
    pub forecast_table: Vec<ForecastRow>,
    pub attempts: Vec<TierAttempt>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub daylight: DaylightStatus,
    pub remaining_daylight: Option<String>,
    pub evaluation: EvaluationResult,
}

pub struct WeatherCheckService {
    locator: StationLocator,
    cascade: Cascade,
    daylight: Arc<dyn DaylightProvider>,
    timezone: Tz,
}

impl WeatherCheckService {
    #[must_use]
    pub fn new(
        locator: StationLocator,
        cascade: Cascade,
        daylight: Arc<dyn DaylightProvider>,
        timezone: Tz,
    ) -> Self {
        Self {
            locator,
            cascade,
            daylight,
            timezone,
        }
    }

    /// Wire the real upstream adapters from configuration
    pub fn from_config(config: &WeatherCheckConfig, tables: Arc<ReferenceTables>) -> Result<Self> {
        let client = SourceClient::new(&config.sources)?;
        let cache = ForecastCache::from_config(&config.cache);

        let cascade = Cascade::new(
            Arc::new(MetarSource::new(client.clone(), &config.sources.metar_url)),
            Arc::new(TafSource::new(client.clone(), &config.sources.taf_url)),
            Arc::new(GriddedForecastSource::new(
                client.clone(),
                &config.sources.nws_url,
                cache,
            )),
            TierWindows::from(&config.cascade),
        );

        let daylight: Arc<dyn DaylightProvider> = match config.daylight.source {
            DaylightSource::Api => Arc::new(SunriseSunsetClient::new(
                client,
                &config.sources.daylight_url,
            )),
            DaylightSource::Solar => Arc::new(SolarCalculator),
        };

        Ok(Self::new(
            StationLocator::new(tables),
            cascade,
            daylight,
            config.display.tz()?,
        ))
    }

    #[must_use]
    pub fn sites(&self) -> &[SiteReference] {
        &self.locator.tables().sites
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub async fn check(&self, request: &CheckRequest) -> Result<FlightCheckReport> {
        self.check_at(request, Utc::now()).await
    }

    /// Run a check as if the current time were `now`
    #[instrument(skip_all, fields(date = %request.date, time = %request.time))]
    pub async fn check_at(
        &self,
        request: &CheckRequest,
        now: DateTime<Utc>,
    ) -> Result<FlightCheckReport> {
        // Input problems surface here, before any network call
        let location = CoordinateResolver::resolve(self.locator.tables(), &request.location)?;
        let query = FlightQuery::from_local(
            location.coordinates,
            &request.date,
            &request.time,
            self.timezone,
        )?;

        let stations = self.locator.locate(&query.coordinates, location.site.as_ref());

        let (outcome, window) = tokio::join!(
            self.cascade.resolve(&query, &stations, now),
            daylight::lookup(self.daylight.as_ref(), &query.coordinates, query.local_date)
        );

        let status = daylight::classify(window.as_ref(), query.flight_time);
        let evaluation = rules::evaluate(&outcome.observation, &status);

        info!(
            decision = %evaluation.decision,
            source = %outcome.observation.source,
            reasons = evaluation.reasons.len(),
            "Flight check for {} at {}",
            location.label,
            query.local_display
        );

        let local_clock = |instant: DateTime<Utc>| {
            instant
                .with_timezone(&self.timezone)
                .format("%I:%M %p %Z")
                .to_string()
        };
        let local_stamp = |instant: DateTime<Utc>| {
            instant
                .with_timezone(&self.timezone)
                .format("%m/%d %I:%M %p %Z")
                .to_string()
        };

        let forecast_table = outcome
            .observation
            .segments
            .iter()
            .map(|segment| ForecastRow {
                from: local_stamp(segment.valid_from),
                to: local_stamp(segment.valid_to),
                wind: format!("{:.1} mph", segment.wind_mph),
                visibility: format!("{:.1} statute miles", segment.visibility_sm),
                ceiling: segment.ceiling.to_string(),
                clouds: segment.clouds.clone(),
                condition: segment.condition.clone(),
                selected: outcome.observation.valid_from == Some(segment.valid_from)
                    && outcome.observation.valid_to == Some(segment.valid_to),
            })
            .collect();

        Ok(FlightCheckReport {
            site_id: location.site.as_ref().map(|site| site.id.clone()),
            coordinates_dms: query.coordinates.format_dms(),
            coordinates: query.coordinates,
            local_time: query.local_display.clone(),
            flight_time_utc: query.flight_time,
            stations,
            wind: outcome.observation.format_wind(),
            visibility: outcome.observation.format_visibility(),
            ceiling: outcome.observation.ceiling.to_string(),
            ceiling_ft: outcome.observation.ceiling.feet(),
            raw_text: outcome.observation.raw_text.clone(),
            forecast_table,
            observation: outcome.observation,
            attempts: outcome.attempts,
            sunrise: window.map(|w| local_clock(w.sunrise)),
            sunset: window.map(|w| local_clock(w.sunset)),
            remaining_daylight: status.remaining_daylight(),
            daylight: status,
            evaluation,
            location: location.label,
        })
    }
}
