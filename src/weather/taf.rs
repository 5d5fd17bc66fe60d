//! Short-range-forecast adapter backed by aviationweather.gov TAF XML

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::aviation::{self, SkyCondition};
use super::{SourceClient, WeatherSource, wx};
use crate::Result;
use crate::error::WeatherCheckError;
use crate::models::{
    FlightQuery, ForecastSegment, NormalizedObservation, SourceTier, UNKNOWN_CONDITION,
};
use crate::stations::NearestStations;

const TIER: SourceTier = SourceTier::ShortRange;

#[derive(Debug, Deserialize)]
struct TafResponse {
    data: Option<TafData>,
}

#[derive(Debug, Deserialize)]
struct TafData {
    #[serde(rename = "TAF", default)]
    tafs: Vec<TafRecord>,
}

#[derive(Debug, Deserialize)]
struct TafRecord {
    raw_text: Option<String>,
    station_id: Option<String>,
    #[serde(default)]
    forecast: Vec<TafForecast>,
}

#[derive(Debug, Deserialize)]
struct TafForecast {
    fcst_time_from: Option<String>,
    fcst_time_to: Option<String>,
    wind_speed_kt: Option<String>,
    visibility_statute_mi: Option<String>,
    wx_string: Option<String>,
    #[serde(default)]
    sky_condition: Vec<SkyCondition>,
}

impl TafForecast {
    /// `None` when either bound of the validity window is unreadable
    fn normalize(&self) -> Option<ForecastSegment> {
        let valid_from = aviation::parse_time(self.fcst_time_from.as_deref())?;
        let valid_to = aviation::parse_time(self.fcst_time_to.as_deref())?;
        Some(ForecastSegment {
            valid_from,
            valid_to,
            wind_mph: aviation::wind_mph(self.wind_speed_kt.as_deref()),
            visibility_sm: aviation::visibility_sm(self.visibility_statute_mi.as_deref()),
            ceiling: aviation::ceiling(&self.sky_condition),
            clouds: aviation::cloud_layers(&self.sky_condition),
            condition: self
                .wx_string
                .as_deref()
                .and_then(wx::decode_weather)
                .unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
        })
    }
}

/// Latest TAF for the nearest (or pinned) forecast-issuing station
pub struct TafSource {
    client: SourceClient,
    base_url: String,
}

impl TafSource {
    pub fn new(client: SourceClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for TafSource {
    fn tier(&self) -> SourceTier {
        TIER
    }

    #[instrument(name = "taf_fetch", skip_all, fields(flight_time = %query.flight_time))]
    async fn fetch(
        &self,
        query: &FlightQuery,
        stations: &NearestStations,
    ) -> Result<NormalizedObservation> {
        let station = stations.forecast.as_ref().ok_or_else(|| {
            WeatherCheckError::source_unavailable(TIER, "no forecast station available")
        })?;

        let url = format!(
            "{}?format=xml&ids={}",
            self.base_url,
            urlencoding::encode(&station.id)
        );
        debug!("Requesting TAF for {}", station.id);

        let body = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| WeatherCheckError::source_unavailable(TIER, format!("{e:#}")))?;

        parse_taf(&body, &station.id, query.flight_time)
    }
}

/// Normalize the TAF segment whose validity window contains `at` (bounds inclusive).
///
/// The observation also carries the raw TAF text and every readable segment.
pub fn parse_taf(xml: &str, station_id: &str, at: DateTime<Utc>) -> Result<NormalizedObservation> {
    let response: TafResponse = quick_xml::de::from_str(xml).map_err(|e| {
        WeatherCheckError::source_unavailable(TIER, format!("unreadable TAF response: {e}"))
    })?;

    let taf = response
        .data
        .and_then(|data| data.tafs.into_iter().next())
        .ok_or_else(|| {
            WeatherCheckError::source_unavailable(TIER, format!("no TAF issued for {station_id}"))
        })?;

    let segments: Vec<ForecastSegment> = taf
        .forecast
        .iter()
        .filter_map(TafForecast::normalize)
        .collect();

    let selected = segments
        .iter()
        .find(|segment| segment.covers(at))
        .cloned()
        .ok_or_else(|| {
            WeatherCheckError::source_unavailable(
                TIER,
                format!("no TAF segment for {station_id} covers {at}"),
            )
        })?;

    Ok(NormalizedObservation {
        source: TIER,
        reported_by: Some(taf.station_id.unwrap_or_else(|| station_id.to_string())),
        wind_mph: selected.wind_mph,
        visibility_sm: selected.visibility_sm,
        ceiling: selected.ceiling,
        condition: selected.condition,
        valid_from: Some(selected.valid_from),
        valid_to: Some(selected.valid_to),
        raw_text: taf.raw_text.map(|text| text.trim().to_string()),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ceiling;
    use chrono::TimeZone;

    const TAF_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response version="1.3">
  <data num_results="1">
    <TAF>
      <raw_text>TAF KSWO 011720Z 0118/0218 18012KT P6SM SCT040 FM020000 20008KT 5SM -SHRA BKN015</raw_text>
      <station_id>KSWO</station_id>
      <issue_time>2025-05-01T17:20:00Z</issue_time>
      <valid_time_from>2025-05-01T18:00:00Z</valid_time_from>
      <valid_time_to>2025-05-02T18:00:00Z</valid_time_to>
      <forecast>
        <fcst_time_from>2025-05-01T18:00:00Z</fcst_time_from>
        <fcst_time_to>2025-05-02T00:00:00Z</fcst_time_to>
        <wind_dir_degrees>180</wind_dir_degrees>
        <wind_speed_kt>12</wind_speed_kt>
        <visibility_statute_mi>6+</visibility_statute_mi>
        <sky_condition sky_cover="SCT" cloud_base_ft_agl="4000" />
      </forecast>
      <forecast>
        <fcst_time_from>2025-05-02T00:00:00Z</fcst_time_from>
        <fcst_time_to>2025-05-02T18:00:00Z</fcst_time_to>
        <change_indicator>FM</change_indicator>
        <wind_dir_degrees>200</wind_dir_degrees>
        <wind_speed_kt>8</wind_speed_kt>
        <visibility_statute_mi>5</visibility_statute_mi>
        <wx_string>-SHRA</wx_string>
        <sky_condition sky_cover="BKN" cloud_base_ft_agl="1500" />
      </forecast>
    </TAF>
  </data>
</response>"#;

    #[test]
    fn test_selects_containing_segment() {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 21, 0, 0).unwrap();
        let obs = parse_taf(TAF_XML, "KSWO", at).unwrap();
        assert_eq!(obs.source, SourceTier::ShortRange);
        assert_eq!(obs.wind_mph, 13.8);
        assert_eq!(obs.visibility_sm, 6.0);
        assert_eq!(obs.ceiling, Ceiling::Unlimited);
        assert_eq!(obs.condition, "Unknown");
        assert_eq!(obs.valid_to.unwrap().to_rfc3339(), "2025-05-02T00:00:00+00:00");
    }

    #[test]
    fn test_keeps_raw_text_and_every_segment() {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 21, 0, 0).unwrap();
        let obs = parse_taf(TAF_XML, "KSWO", at).unwrap();
        assert_eq!(
            obs.raw_text.as_deref(),
            Some("TAF KSWO 011720Z 0118/0218 18012KT P6SM SCT040 FM020000 20008KT 5SM -SHRA BKN015")
        );
        assert_eq!(obs.segments.len(), 2);
        assert_eq!(obs.segments[0].clouds, "4000 ft");
        assert_eq!(obs.segments[1].wind_mph, 9.2);
        assert_eq!(obs.segments[1].ceiling, Ceiling::Feet(1500));
        assert_eq!(obs.segments[1].clouds, "1500 ft");
        assert_eq!(obs.segments[1].condition, "Light rain showers");
    }

    #[test]
    fn test_boundary_belongs_to_first_matching_segment() {
        let at = Utc.with_ymd_and_hms(2025, 5, 2, 0, 0, 0).unwrap();
        let obs = parse_taf(TAF_XML, "KSWO", at).unwrap();
        assert_eq!(obs.wind_mph, 13.8);
    }

    #[test]
    fn test_later_segment() {
        let at = Utc.with_ymd_and_hms(2025, 5, 2, 6, 30, 0).unwrap();
        let obs = parse_taf(TAF_XML, "KSWO", at).unwrap();
        assert_eq!(obs.wind_mph, 9.2);
        assert_eq!(obs.visibility_sm, 5.0);
        assert_eq!(obs.ceiling, Ceiling::Feet(1500));
        assert_eq!(obs.condition, "Light rain showers");
    }

    #[test]
    fn test_time_outside_forecast_is_failure() {
        let at = Utc.with_ymd_and_hms(2025, 5, 3, 12, 0, 0).unwrap();
        let err = parse_taf(TAF_XML, "KSWO", at).unwrap_err();
        assert!(matches!(
            err,
            WeatherCheckError::SourceUnavailable {
                tier: SourceTier::ShortRange,
                ..
            }
        ));
    }

    #[test]
    fn test_segment_with_bad_times_is_skipped() {
        let xml = r#"<response><data><TAF><station_id>KLAW</station_id>
            <forecast>
              <fcst_time_from>soon</fcst_time_from>
              <fcst_time_to>2025-05-02T00:00:00Z</fcst_time_to>
              <wind_speed_kt>30</wind_speed_kt>
            </forecast>
            <forecast>
              <fcst_time_from>2025-05-01T00:00:00Z</fcst_time_from>
              <fcst_time_to>2025-05-02T00:00:00Z</fcst_time_to>
              <wind_speed_kt>4</wind_speed_kt>
              <visibility_statute_mi>6+</visibility_statute_mi>
            </forecast>
        </TAF></data></response>"#;
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let obs = parse_taf(xml, "KLAW", at).unwrap();
        assert_eq!(obs.wind_mph, 4.6);
        assert_eq!(obs.segments.len(), 1);
        assert!(obs.raw_text.is_none());
    }

    #[test]
    fn test_no_taf_is_failure() {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        assert!(parse_taf(r#"<response><data num_results="0"/></response>"#, "KXXX", at).is_err());
    }
}
