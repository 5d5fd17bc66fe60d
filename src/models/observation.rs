//! Canonical weather snapshot produced by every source adapter

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ceiling height reported for the "unlimited" sentinel
pub const UNLIMITED_CEILING_FT: u32 = 10_000;

/// Condition text used when a source does not provide one
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Which weather source produced an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTier {
    /// Live station observation (METAR)
    Current,
    /// Terminal aerodrome forecast (TAF)
    ShortRange,
    /// NWS gridded hourly forecast
    Gridded,
    /// No source produced data
    None,
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceTier::Current => "current observation",
            SourceTier::ShortRange => "short-range forecast",
            SourceTier::Gridded => "gridded forecast",
            SourceTier::None => "none",
        };
        f.write_str(label)
    }
}

/// Lowest broken or overcast layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "feet", rename_all = "snake_case")]
pub enum Ceiling {
    Unlimited,
    Feet(u32),
}

impl Ceiling {
    /// Height in feet AGL, with `Unlimited` reported as 10000 ft
    #[must_use]
    pub fn feet(&self) -> u32 {
        match self {
            Ceiling::Unlimited => UNLIMITED_CEILING_FT,
            Ceiling::Feet(ft) => *ft,
        }
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::Unlimited => f.write_str("Unlimited"),
            Ceiling::Feet(ft) => write!(f, "{ft} ft"),
        }
    }
}

/// One time-bounded group of a terminal forecast, in the same fixed units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSegment {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub wind_mph: f64,
    pub visibility_sm: f64,
    pub ceiling: Ceiling,
    /// Every reported layer base, e.g. `4000 ft, 1500 ft`, or `None`
    pub clouds: String,
    pub condition: String,
}

impl ForecastSegment {
    /// Bounds are inclusive on both ends
    #[must_use]
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at <= self.valid_to
    }
}

/// Weather snapshot in fixed units: mph, statute miles, feet AGL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedObservation {
    pub source: SourceTier,
    /// Station or office that reported the data
    pub reported_by: Option<String>,
    pub wind_mph: f64,
    pub visibility_sm: f64,
    pub ceiling: Ceiling,
    pub condition: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    /// Report text exactly as issued (METAR or TAF)
    #[serde(default)]
    pub raw_text: Option<String>,
    /// All groups of the forecast this observation was selected from
    #[serde(default)]
    pub segments: Vec<ForecastSegment>,
}

impl NormalizedObservation {
    /// Observation carried when every eligible source failed.
    ///
    /// Zero visibility fails the rules while zero wind and an unlimited ceiling pass them.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            source: SourceTier::None,
            reported_by: None,
            wind_mph: 0.0,
            visibility_sm: 0.0,
            ceiling: Ceiling::Unlimited,
            condition: UNKNOWN_CONDITION.to_string(),
            valid_from: None,
            valid_to: None,
            raw_text: None,
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} mph", self.wind_mph)
    }

    #[must_use]
    pub fn format_visibility(&self) -> String {
        format!("{:.1} statute miles", self.visibility_sm)
    }
}
