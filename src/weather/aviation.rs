//! Field normalization shared by the METAR and TAF adapters

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::Ceiling;
use crate::units;

/// `<sky_condition sky_cover="BKN" cloud_base_ft_agl="1500"/>`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SkyCondition {
    #[serde(rename = "@sky_cover")]
    pub sky_cover: Option<String>,
    #[serde(rename = "@cloud_base_ft_agl")]
    pub cloud_base_ft_agl: Option<String>,
}

/// Wind in mph from a knots field; absent or malformed gives 0
#[must_use]
pub fn wind_mph(wind_speed_kt: Option<&str>) -> f64 {
    wind_speed_kt
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|kt| kt.is_finite() && *kt >= 0.0)
        .map_or(0.0, units::knots_to_mph)
}

/// Visibility in statute miles; absent or malformed gives 0 (treated as poor)
#[must_use]
pub fn visibility_sm(visibility_statute_mi: Option<&str>) -> f64 {
    visibility_statute_mi
        .and_then(units::parse_visibility_sm)
        .unwrap_or(0.0)
}

/// First broken or overcast layer with a readable base; otherwise unlimited
#[must_use]
pub fn ceiling(layers: &[SkyCondition]) -> Ceiling {
    layers
        .iter()
        .filter(|layer| matches!(layer.sky_cover.as_deref(), Some("BKN" | "OVC")))
        .find_map(|layer| {
            layer
                .cloud_base_ft_agl
                .as_deref()
                .and_then(|base| base.trim().parse::<u32>().ok())
        })
        .map_or(Ceiling::Unlimited, Ceiling::Feet)
}

/// Every layer base in report order, e.g. `4000 ft, 1500 ft`; `None` when no base is given
#[must_use]
pub fn cloud_layers(layers: &[SkyCondition]) -> String {
    let bases: Vec<String> = layers
        .iter()
        .filter_map(|layer| layer.cloud_base_ft_agl.as_deref())
        .map(|base| format!("{} ft", base.trim()))
        .collect();
    if bases.is_empty() {
        "None".to_string()
    } else {
        bases.join(", ")
    }
}

/// Parse an aviationweather timestamp such as `2025-05-01T18:00:00Z`
#[must_use]
pub fn parse_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(cover: &str, base: Option<&str>) -> SkyCondition {
        SkyCondition {
            sky_cover: Some(cover.to_string()),
            cloud_base_ft_agl: base.map(str::to_string),
        }
    }

    #[test]
    fn test_wind_defaults_to_zero() {
        assert_eq!(wind_mph(Some("10")), 11.5);
        assert_eq!(wind_mph(None), 0.0);
        assert_eq!(wind_mph(Some("VRB")), 0.0);
    }

    #[test]
    fn test_visibility_defaults_to_zero() {
        assert_eq!(visibility_sm(Some("10+")), 10.0);
        assert_eq!(visibility_sm(None), 0.0);
        assert_eq!(visibility_sm(Some("abc")), 0.0);
    }

    #[test]
    fn test_ceiling_first_broken_or_overcast() {
        let layers = vec![
            layer("FEW", Some("800")),
            layer("SCT", Some("1200")),
            layer("BKN", Some("2500")),
            layer("OVC", Some("4000")),
        ];
        assert_eq!(ceiling(&layers), Ceiling::Feet(2500));
    }

    #[test]
    fn test_ceiling_skips_layers_without_base() {
        let layers = vec![layer("BKN", None), layer("OVC", Some("900"))];
        assert_eq!(ceiling(&layers), Ceiling::Feet(900));
    }

    #[test]
    fn test_ceiling_unlimited_when_absent() {
        assert_eq!(ceiling(&[]), Ceiling::Unlimited);
        assert_eq!(ceiling(&[layer("CLR", None)]), Ceiling::Unlimited);
        assert_eq!(ceiling(&[layer("SCT", Some("300"))]), Ceiling::Unlimited);
    }

    #[test]
    fn test_cloud_layers() {
        let layers = vec![
            layer("SCT", Some("4000")),
            layer("CLR", None),
            layer("BKN", Some("1500")),
        ];
        assert_eq!(cloud_layers(&layers), "4000 ft, 1500 ft");
        assert_eq!(cloud_layers(&[layer("SKC", None)]), "None");
    }

    #[test]
    fn test_parse_time() {
        let parsed = parse_time(Some("2025-05-01T18:53:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-05-01T18:53:00+00:00");
        assert!(parse_time(Some("yesterday")).is_none());
        assert!(parse_time(None).is_none());
    }
}
