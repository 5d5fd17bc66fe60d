//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use uas_weather_check::cascade::TierWindows;
use uas_weather_check::stations::{ForecastOffice, SiteReference, StationReference};
use uas_weather_check::{
    Cascade, Ceiling, Coordinates, DaylightProvider, DaylightWindow, FlightQuery, NearestStations,
    NormalizedObservation, ReferenceTables, Result, SourceTier, StationLocator,
    WeatherCheckError, WeatherCheckService, WeatherSource,
};

pub struct StubSource {
    tier: SourceTier,
    observation: Option<NormalizedObservation>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn ok(tier: SourceTier, wind_mph: f64, condition: &str) -> Arc<Self> {
        Arc::new(Self {
            tier,
            observation: Some(NormalizedObservation {
                source: tier,
                reported_by: Some(format!("{tier:?}")),
                wind_mph,
                visibility_sm: 10.0,
                ceiling: Ceiling::Feet(3500),
                condition: condition.to_string(),
                valid_from: None,
                valid_to: None,
                raw_text: None,
                segments: Vec::new(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with(observation: NormalizedObservation) -> Arc<Self> {
        Arc::new(Self {
            tier: observation.source,
            observation: Some(observation),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(tier: SourceTier) -> Arc<Self> {
        Arc::new(Self {
            tier,
            observation: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for StubSource {
    fn tier(&self) -> SourceTier {
        self.tier
    }

    async fn fetch(
        &self,
        _query: &FlightQuery,
        _stations: &NearestStations,
    ) -> Result<NormalizedObservation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.observation
            .clone()
            .ok_or_else(|| WeatherCheckError::source_unavailable(self.tier, "stub offline"))
    }
}

/// Sunrise 11:40 UTC on the date, sunset 01:20 UTC the next day
pub struct StubDaylight {
    pub available: bool,
}

#[async_trait]
impl DaylightProvider for StubDaylight {
    async fn window(&self, _coordinates: &Coordinates, date: NaiveDate) -> Result<DaylightWindow> {
        if !self.available {
            return Err(WeatherCheckError::daylight("stub offline"));
        }
        let sunrise = date.and_time(NaiveTime::from_hms_opt(11, 40, 0).unwrap()).and_utc();
        let next = date.checked_add_days(Days::new(1)).unwrap();
        let sunset = next.and_time(NaiveTime::from_hms_opt(1, 20, 0).unwrap()).and_utc();
        DaylightWindow::new(sunrise, sunset)
    }
}

pub fn tables() -> ReferenceTables {
    ReferenceTables {
        sites: vec![SiteReference {
            id: "UAFS".to_string(),
            name: "Unmanned Aircraft Flight Station".to_string(),
            coordinates: Coordinates::new(36.162_353, -98.836_239).unwrap(),
            station: Some("KSWO".to_string()),
            forecast_station: None,
            forecast_office: Some("OUN/43,34".to_string()),
        }],
        observation_stations: vec![
            StationReference {
                id: "KSWO".to_string(),
                name: Some("Stillwater Regional".to_string()),
                coordinates: Coordinates::new(36.1612, -97.0857).unwrap(),
            },
            StationReference {
                id: "KCSM".to_string(),
                name: Some("Clinton-Sherman".to_string()),
                coordinates: Coordinates::new(35.3398, -99.2005).unwrap(),
            },
        ],
        forecast_stations: vec![StationReference {
            id: "KSWO".to_string(),
            name: None,
            coordinates: Coordinates::new(36.1612, -97.0857).unwrap(),
        }],
        forecast_offices: vec![ForecastOffice {
            office: "OUN".to_string(),
            grid_x: 43,
            grid_y: 34,
            coordinates: Coordinates::new(35.2226, -97.4395).unwrap(),
        }],
    }
}

pub struct Harness {
    pub current: Arc<StubSource>,
    pub short_range: Arc<StubSource>,
    pub gridded: Arc<StubSource>,
    pub service: WeatherCheckService,
}

pub fn harness(
    current: Arc<StubSource>,
    short_range: Arc<StubSource>,
    gridded: Arc<StubSource>,
    daylight_available: bool,
) -> Harness {
    let cascade = Cascade::new(
        current.clone(),
        short_range.clone(),
        gridded.clone(),
        TierWindows::default(),
    );
    let service = WeatherCheckService::new(
        StationLocator::new(Arc::new(tables())),
        cascade,
        Arc::new(StubDaylight {
            available: daylight_available,
        }),
        chrono_tz::America::Chicago,
    );
    Harness {
        current,
        short_range,
        gridded,
        service,
    }
}

pub fn all_good() -> Harness {
    harness(
        StubSource::ok(SourceTier::Current, 8.1, "VFR"),
        StubSource::ok(SourceTier::ShortRange, 9.2, "Unknown"),
        StubSource::ok(SourceTier::Gridded, 10.0, "Sunny"),
        true,
    )
}
