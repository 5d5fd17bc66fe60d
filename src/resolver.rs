//! Coordinate resolution
//!
//! Turns what the operator entered (a known site id, decimal degrees, or
//! degrees/minutes/seconds with hemisphere letters) into validated [`Coordinates`].
//! Form fields arrive as text, so missing and non-numeric values are reported here
//! as `InvalidInput` before anything touches the network.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::error::WeatherCheckError;
use crate::models::Coordinates;
use crate::stations::{ReferenceTables, SiteReference};

/// One DMS component as entered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DmsInput {
    #[serde(default)]
    pub degrees: String,
    #[serde(default)]
    pub minutes: String,
    #[serde(default)]
    pub seconds: String,
    /// `N`/`S` for latitude, `E`/`W` for longitude
    #[serde(default)]
    pub hemisphere: String,
}

/// Location as entered by the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoordinateInput {
    /// Known flight site id, e.g. `UAFS`
    Site { id: String },
    /// Decimal degrees
    Decimal {
        #[serde(default)]
        latitude: String,
        #[serde(default)]
        longitude: String,
    },
    /// Degrees, minutes, seconds
    Dms { latitude: DmsInput, longitude: DmsInput },
}

/// Validated location ready for the station lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub label: String,
    pub coordinates: Coordinates,
    /// Set when the input named a known site
    #[serde(skip)]
    pub site: Option<SiteReference>,
}

#[derive(Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }

    /// Sign for a hemisphere letter, or `None` when the letter does not belong to this axis
    fn sign(self, hemisphere: &str) -> Option<f64> {
        match (self, hemisphere.trim().to_ascii_uppercase().as_str()) {
            (Self::Latitude, "N") | (Self::Longitude, "E") => Some(1.0),
            (Self::Latitude, "S") | (Self::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WeatherCheckError::invalid_input(format!("{field} is required")));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| WeatherCheckError::invalid_input(format!("{field} '{raw}' is not a number")))
}

/// `deg + min/60 + sec/3600`, negated for S or W
pub fn dms_to_decimal(
    degrees: f64,
    minutes: f64,
    seconds: f64,
    hemisphere: &str,
    latitude: bool,
) -> Result<f64> {
    let axis = if latitude { Axis::Latitude } else { Axis::Longitude };
    dms_component(axis, degrees, minutes, seconds, hemisphere)
}

fn dms_component(
    axis: Axis,
    degrees: f64,
    minutes: f64,
    seconds: f64,
    hemisphere: &str,
) -> Result<f64> {
    let name = axis.name();
    if degrees < 0.0 {
        return Err(WeatherCheckError::invalid_input(format!(
            "{name} degrees must not be negative; use the hemisphere letter"
        )));
    }
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(WeatherCheckError::invalid_input(format!(
            "{name} minutes and seconds must be in [0, 60)"
        )));
    }
    let sign = axis.sign(hemisphere).ok_or_else(|| {
        WeatherCheckError::invalid_input(format!(
            "'{}' is not a valid {name} hemisphere",
            hemisphere.trim()
        ))
    })?;

    Ok(sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}

fn parse_dms(axis: Axis, input: &DmsInput) -> Result<f64> {
    let name = axis.name();
    let degrees = parse_number(&format!("{name} degrees"), &input.degrees)?;
    let minutes = parse_number(&format!("{name} minutes"), &input.minutes)?;
    let seconds = parse_number(&format!("{name} seconds"), &input.seconds)?;
    dms_component(axis, degrees, minutes, seconds, &input.hemisphere)
}

/// Resolves operator input into coordinates; never touches the network
pub struct CoordinateResolver;

impl CoordinateResolver {
    pub fn resolve(tables: &ReferenceTables, input: &CoordinateInput) -> Result<ResolvedLocation> {
        debug!("Resolving coordinate input: {:?}", input);

        let resolved = match input {
            CoordinateInput::Site { id } => {
                let site = tables.find_site(id).ok_or_else(|| {
                    WeatherCheckError::invalid_input(format!("unknown site '{}'", id.trim()))
                })?;
                ResolvedLocation {
                    label: site.name.clone(),
                    coordinates: site.coordinates,
                    site: Some(site.clone()),
                }
            }
            CoordinateInput::Decimal {
                latitude,
                longitude,
            } => {
                let coordinates = Coordinates::new(
                    parse_number("latitude", latitude)?,
                    parse_number("longitude", longitude)?,
                )?;
                ResolvedLocation {
                    label: coordinates.format_coordinates(),
                    coordinates,
                    site: None,
                }
            }
            CoordinateInput::Dms {
                latitude,
                longitude,
            } => {
                let coordinates = Coordinates::new(
                    parse_dms(Axis::Latitude, latitude)?,
                    parse_dms(Axis::Longitude, longitude)?,
                )?;
                ResolvedLocation {
                    label: coordinates.format_dms(),
                    coordinates,
                    site: None,
                }
            }
        };

        debug!(
            "Resolved location: {} at ({:.6}, {:.6})",
            resolved.label,
            resolved.coordinates.latitude(),
            resolved.coordinates.longitude()
        );
        Ok(resolved)
    }
}
