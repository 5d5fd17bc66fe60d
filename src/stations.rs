//! Static reference tables and nearest-station lookup
//!
//! Four TOML tables are loaded once at start-up and shared read-only between requests:
//! known flight sites, current-observation stations, forecast-issuing stations and
//! gridded-forecast office grid points. A table that fails to load is logged and replaced
//! by an empty one, so lookups against it simply find nothing.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::ReferenceConfig;
use crate::error::WeatherCheckError;
use crate::models::Coordinates;

/// Anything with a fixed position that can take part in a nearest-neighbour search
pub trait Located {
    fn coordinates(&self) -> &Coordinates;
}

/// Observation or forecast station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReference {
    pub id: String,
    pub name: Option<String>,
    pub coordinates: Coordinates,
}

/// NWS forecast office grid point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOffice {
    pub office: String,
    pub grid_x: u32,
    pub grid_y: u32,
    pub coordinates: Coordinates,
}

impl ForecastOffice {
    /// `OUN/43,34`
    #[must_use]
    pub fn grid_label(&self) -> String {
        format!("{}/{},{}", self.office, self.grid_x, self.grid_y)
    }
}

/// Named flight site, optionally pinned to specific stations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteReference {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    /// Observation station id used instead of the nearest one
    pub station: Option<String>,
    /// Forecast station id; falls back to `station` when unset
    pub forecast_station: Option<String>,
    /// Grid label such as `OUN/43,34`
    pub forecast_office: Option<String>,
}

impl Located for StationReference {
    fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }
}

impl Located for ForecastOffice {
    fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }
}

impl Located for SiteReference {
    fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }
}

#[derive(Debug, Deserialize)]
struct StationFile {
    #[serde(default)]
    stations: Vec<StationRow>,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    id: String,
    name: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OfficeFile {
    #[serde(default)]
    offices: Vec<OfficeRow>,
}

#[derive(Debug, Deserialize)]
struct OfficeRow {
    office: String,
    grid_x: u32,
    grid_y: u32,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct SiteFile {
    #[serde(default)]
    sites: Vec<SiteRow>,
}

#[derive(Debug, Deserialize)]
struct SiteRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    station: Option<String>,
    forecast_station: Option<String>,
    forecast_office: Option<String>,
}

fn read_table<T: for<'de> Deserialize<'de>>(table: &str, path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        WeatherCheckError::reference_missing(table, format!("{}: {e}", path.display()))
    })?;
    toml::from_str(&content).map_err(|e| {
        WeatherCheckError::reference_missing(table, format!("{}: {e}", path.display()))
    })
}

/// Validate a row's position, logging and dropping rows that are out of range
fn row_coordinates(table: &str, id: &str, latitude: f64, longitude: f64) -> Option<Coordinates> {
    match Coordinates::new(latitude, longitude) {
        Ok(coordinates) => Some(coordinates),
        Err(e) => {
            warn!("Skipping {} entry '{}': {}", table, id, e);
            None
        }
    }
}

/// Load a station table (`[[stations]]` rows)
pub fn load_stations(table: &str, path: &Path) -> Result<Vec<StationReference>> {
    let file: StationFile = read_table(table, path)?;
    Ok(file
        .stations
        .into_iter()
        .filter_map(|row| {
            let coordinates = row_coordinates(table, &row.id, row.latitude, row.longitude)?;
            Some(StationReference {
                id: row.id.trim().to_uppercase(),
                name: row.name,
                coordinates,
            })
        })
        .collect())
}

/// Load the forecast office grid table (`[[offices]]` rows)
pub fn load_offices(path: &Path) -> Result<Vec<ForecastOffice>> {
    let file: OfficeFile = read_table(FORECAST_OFFICES, path)?;
    Ok(file
        .offices
        .into_iter()
        .filter_map(|row| {
            let coordinates =
                row_coordinates(FORECAST_OFFICES, &row.office, row.latitude, row.longitude)?;
            Some(ForecastOffice {
                office: row.office.trim().to_uppercase(),
                grid_x: row.grid_x,
                grid_y: row.grid_y,
                coordinates,
            })
        })
        .collect())
}

/// Load the known flight sites (`[[sites]]` rows)
pub fn load_sites(path: &Path) -> Result<Vec<SiteReference>> {
    let file: SiteFile = read_table(SITES, path)?;
    Ok(file
        .sites
        .into_iter()
        .filter_map(|row| {
            let coordinates = row_coordinates(SITES, &row.id, row.latitude, row.longitude)?;
            Some(SiteReference {
                id: row.id,
                name: row.name,
                coordinates,
                station: row.station,
                forecast_station: row.forecast_station,
                forecast_office: row.forecast_office,
            })
        })
        .collect())
}

pub const SITES: &str = "sites";
pub const OBSERVATION_STATIONS: &str = "observation_stations";
pub const FORECAST_STATIONS: &str = "forecast_stations";
pub const FORECAST_OFFICES: &str = "forecast_offices";

/// Replace a failed load with an empty table
fn or_empty<T>(loaded: Result<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|e| {
        warn!("{}; lookups against this table will find nothing", e);
        Vec::new()
    })
}

/// All reference tables, loaded once
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub sites: Vec<SiteReference>,
    pub observation_stations: Vec<StationReference>,
    pub forecast_stations: Vec<StationReference>,
    pub forecast_offices: Vec<ForecastOffice>,
}

impl ReferenceTables {
    /// Load every configured table; never fails
    pub fn load(config: &ReferenceConfig) -> Self {
        let tables = Self {
            sites: or_empty(load_sites(Path::new(&config.sites_path))),
            observation_stations: or_empty(load_stations(
                OBSERVATION_STATIONS,
                Path::new(&config.observation_stations_path),
            )),
            forecast_stations: or_empty(load_stations(
                FORECAST_STATIONS,
                Path::new(&config.forecast_stations_path),
            )),
            forecast_offices: or_empty(load_offices(Path::new(&config.forecast_offices_path))),
        };
        info!(
            "Loaded reference tables: {} sites, {} observation stations, {} forecast stations, {} forecast offices",
            tables.sites.len(),
            tables.observation_stations.len(),
            tables.forecast_stations.len(),
            tables.forecast_offices.len()
        );
        tables
    }

    /// Site by id, ignoring case and surrounding whitespace
    #[must_use]
    pub fn find_site(&self, id: &str) -> Option<&SiteReference> {
        let id = id.trim();
        self.sites.iter().find(|site| site.id.eq_ignore_ascii_case(id))
    }
}

/// Entry with the lowest great-circle distance to `target`; `None` for an empty table
pub fn nearest<'a, T: Located>(items: &'a [T], target: &Coordinates) -> Option<&'a T> {
    items
        .iter()
        .map(|item| (item, target.distance_km(item.coordinates())))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(item, _)| item)
}

fn station_by_id<'a>(stations: &'a [StationReference], id: &str) -> Option<&'a StationReference> {
    stations.iter().find(|s| s.id.eq_ignore_ascii_case(id.trim()))
}

/// The stations and grid used to answer one query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NearestStations {
    pub observation: Option<StationReference>,
    pub forecast: Option<StationReference>,
    pub office: Option<ForecastOffice>,
}

/// Nearest-neighbour search over the shared reference tables
#[derive(Debug, Clone)]
pub struct StationLocator {
    tables: Arc<ReferenceTables>,
}

impl StationLocator {
    #[must_use]
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    #[must_use]
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Nearest entry from each table. Pins on `site` win when the pinned id exists.
    pub fn locate(&self, target: &Coordinates, site: Option<&SiteReference>) -> NearestStations {
        let tables = &self.tables;

        let pinned_observation = site
            .and_then(|s| s.station.as_deref())
            .and_then(|id| station_by_id(&tables.observation_stations, id));
        let pinned_forecast = site
            .and_then(|s| s.forecast_station.as_deref().or(s.station.as_deref()))
            .and_then(|id| station_by_id(&tables.forecast_stations, id));
        let pinned_office = site
            .and_then(|s| s.forecast_office.as_deref())
            .and_then(|label| {
                tables
                    .forecast_offices
                    .iter()
                    .find(|o| o.grid_label().eq_ignore_ascii_case(label.trim()))
            });

        let stations = NearestStations {
            observation: pinned_observation
                .or_else(|| nearest(&tables.observation_stations, target))
                .cloned(),
            forecast: pinned_forecast
                .or_else(|| nearest(&tables.forecast_stations, target))
                .cloned(),
            office: pinned_office
                .or_else(|| nearest(&tables.forecast_offices, target))
                .cloned(),
        };

        debug!(
            observation = stations.observation.as_ref().map(|s| s.id.as_str()),
            forecast = stations.forecast.as_ref().map(|s| s.id.as_str()),
            office = stations.office.as_ref().map(|o| o.office.as_str()),
            "Located stations for {}",
            target.format_coordinates()
        );
        stations
    }
}
