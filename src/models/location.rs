//! Geographic coordinates with range validation

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::WeatherCheckError;

/// Validated latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = WeatherCheckError;

    fn try_from(raw: RawCoordinates) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Create coordinates, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherCheckError::invalid_input(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherCheckError::invalid_input(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in kilometers (haversine, R = 6371 km)
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        )
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Format as degrees/minutes/seconds, e.g. `36°9'44.5"N, 98°50'10.5"W`
    #[must_use]
    pub fn format_dms(&self) -> String {
        format!(
            "{}, {}",
            dms_component(self.latitude, 'N', 'S'),
            dms_component(self.longitude, 'E', 'W')
        )
    }
}

fn dms_component(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let abs = value.abs();
    let mut degrees = abs.trunc();
    let mut minutes = ((abs - degrees) * 60.0).trunc();
    let mut seconds = ((abs - degrees - minutes / 60.0) * 3600.0 * 10.0).round() / 10.0;
    if seconds >= 60.0 {
        seconds = 0.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes = 0.0;
        degrees += 1.0;
    }
    format!("{degrees}°{minutes}'{seconds:.1}\"{hemisphere}")
}
