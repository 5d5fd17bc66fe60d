//! Current-observation adapter backed by aviationweather.gov METAR XML

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::aviation::{self, SkyCondition};
use super::{SourceClient, WeatherSource, wx};
use crate::Result;
use crate::error::WeatherCheckError;
use crate::models::{FlightQuery, NormalizedObservation, SourceTier, UNKNOWN_CONDITION};
use crate::stations::NearestStations;

const TIER: SourceTier = SourceTier::Current;

#[derive(Debug, Deserialize)]
struct MetarResponse {
    data: Option<MetarData>,
}

#[derive(Debug, Deserialize)]
struct MetarData {
    #[serde(rename = "METAR", default)]
    metars: Vec<MetarRecord>,
}

#[derive(Debug, Deserialize)]
struct MetarRecord {
    raw_text: Option<String>,
    station_id: Option<String>,
    observation_time: Option<String>,
    wind_speed_kt: Option<String>,
    visibility_statute_mi: Option<String>,
    #[serde(default)]
    sky_condition: Vec<SkyCondition>,
    flight_category: Option<String>,
    wx_string: Option<String>,
}

/// Latest METAR for the nearest (or pinned) observation station
pub struct MetarSource {
    client: SourceClient,
    base_url: String,
}

impl MetarSource {
    pub fn new(client: SourceClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for MetarSource {
    fn tier(&self) -> SourceTier {
        TIER
    }

    #[instrument(name = "metar_fetch", skip_all)]
    async fn fetch(
        &self,
        _query: &FlightQuery,
        stations: &NearestStations,
    ) -> Result<NormalizedObservation> {
        let station = stations.observation.as_ref().ok_or_else(|| {
            WeatherCheckError::source_unavailable(TIER, "no observation station available")
        })?;

        let url = format!(
            "{}?format=xml&ids={}",
            self.base_url,
            urlencoding::encode(&station.id)
        );
        debug!("Requesting METAR for {}", station.id);

        let body = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| WeatherCheckError::source_unavailable(TIER, format!("{e:#}")))?;

        parse_metar(&body, &station.id)
    }
}

/// Normalize the first METAR in an aviationweather XML response
pub fn parse_metar(xml: &str, station_id: &str) -> Result<NormalizedObservation> {
    let response: MetarResponse = quick_xml::de::from_str(xml).map_err(|e| {
        WeatherCheckError::source_unavailable(TIER, format!("unreadable METAR response: {e}"))
    })?;

    let metar = response
        .data
        .and_then(|data| data.metars.into_iter().next())
        .ok_or_else(|| {
            WeatherCheckError::source_unavailable(
                TIER,
                format!("no METAR reported for {station_id}"),
            )
        })?;

    let condition = metar
        .wx_string
        .as_deref()
        .and_then(wx::decode_weather)
        .or_else(|| metar.flight_category.clone().filter(|c| !c.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

    Ok(NormalizedObservation {
        source: TIER,
        reported_by: Some(metar.station_id.unwrap_or_else(|| station_id.to_string())),
        wind_mph: aviation::wind_mph(metar.wind_speed_kt.as_deref()),
        visibility_sm: aviation::visibility_sm(metar.visibility_statute_mi.as_deref()),
        ceiling: aviation::ceiling(&metar.sky_condition),
        condition,
        valid_from: aviation::parse_time(metar.observation_time.as_deref()),
        valid_to: None,
        raw_text: metar.raw_text.map(|text| text.trim().to_string()),
        segments: Vec::new(),
    })
}
