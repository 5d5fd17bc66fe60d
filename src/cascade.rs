//! Source cascade
//!
//! Picks the eligible tiers from how far ahead the flight is, tries them strictly in
//! priority order (current observation, short-range forecast, gridded forecast) and keeps
//! the first success. Each tier is called at most once per request. When every eligible
//! tier fails the outcome carries the `NONE` observation, and the decision is still made
//! on it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::CascadeConfig;
use crate::error::WeatherCheckError;
use crate::models::{FlightQuery, NormalizedObservation, SourceTier};
use crate::stations::NearestStations;
use crate::weather::WeatherSource;

/// Look-ahead limits for the first two tiers; the gridded tier has none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierWindows {
    pub current_max: Duration,
    pub short_range_max: Duration,
}

impl Default for TierWindows {
    fn default() -> Self {
        Self {
            current_max: Duration::hours(2),
            short_range_max: Duration::hours(30),
        }
    }
}

impl From<&CascadeConfig> for TierWindows {
    fn from(config: &CascadeConfig) -> Self {
        Self {
            current_max: Duration::hours(i64::from(config.current_max_hours)),
            short_range_max: Duration::hours(i64::from(config.short_range_max_hours)),
        }
    }
}

impl TierWindows {
    /// Whether `tier` may serve a flight `delta` from now (bounds inclusive)
    #[must_use]
    pub fn is_eligible(&self, tier: SourceTier, delta: Duration) -> bool {
        match tier {
            SourceTier::Current => delta <= self.current_max,
            SourceTier::ShortRange => delta <= self.short_range_max,
            SourceTier::Gridded => true,
            SourceTier::None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Flight too far ahead for this tier
    Ineligible,
    Failed,
    Succeeded,
    /// An earlier tier already answered
    NotNeeded,
}

/// What happened to one tier during a cascade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAttempt {
    pub tier: SourceTier,
    pub status: AttemptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CascadeOutcome {
    pub observation: NormalizedObservation,
    pub attempts: Vec<TierAttempt>,
}

impl CascadeOutcome {
    /// True when no tier produced data
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.observation.source == SourceTier::None
    }

    /// Tiers that were actually called
    pub fn called_tiers(&self) -> impl Iterator<Item = SourceTier> + '_ {
        self.attempts
            .iter()
            .filter(|a| matches!(a.status, AttemptStatus::Failed | AttemptStatus::Succeeded))
            .map(|a| a.tier)
    }
}

/// Single parametrised cascade over three sources
#[derive(Clone)]
pub struct Cascade {
    current: Arc<dyn WeatherSource>,
    short_range: Arc<dyn WeatherSource>,
    gridded: Arc<dyn WeatherSource>,
    windows: TierWindows,
}

impl Cascade {
    #[must_use]
    pub fn new(
        current: Arc<dyn WeatherSource>,
        short_range: Arc<dyn WeatherSource>,
        gridded: Arc<dyn WeatherSource>,
        windows: TierWindows,
    ) -> Self {
        Self {
            current,
            short_range,
            gridded,
            windows,
        }
    }

    /// Run the cascade for `query` as seen at `now`
    #[instrument(name = "cascade", skip_all, fields(flight_time = %query.flight_time))]
    pub async fn resolve(
        &self,
        query: &FlightQuery,
        stations: &NearestStations,
        now: DateTime<Utc>,
    ) -> CascadeOutcome {
        let delta = query.flight_time - now;
        let mut attempts = Vec::with_capacity(3);
        let mut observation = None;

        for source in [&self.current, &self.short_range, &self.gridded] {
            let tier = source.tier();

            if observation.is_some() {
                attempts.push(TierAttempt {
                    tier,
                    status: AttemptStatus::NotNeeded,
                    detail: None,
                });
                continue;
            }

            if !self.windows.is_eligible(tier, delta) {
                attempts.push(TierAttempt {
                    tier,
                    status: AttemptStatus::Ineligible,
                    detail: Some(format!(
                        "flight is {} minutes ahead",
                        delta.num_minutes()
                    )),
                });
                continue;
            }

            match source.fetch(query, stations).await {
                Ok(found) => {
                    info!(
                        "Using {} from {}",
                        tier,
                        found.reported_by.as_deref().unwrap_or("unknown")
                    );
                    attempts.push(TierAttempt {
                        tier,
                        status: AttemptStatus::Succeeded,
                        detail: found.reported_by.clone(),
                    });
                    observation = Some(found);
                }
                Err(e) => {
                    warn!("{}", e);
                    attempts.push(TierAttempt {
                        tier,
                        status: AttemptStatus::Failed,
                        detail: Some(e.to_string()),
                    });
                }
            }
        }

        let observation = observation.unwrap_or_else(|| {
            warn!(
                "{}; evaluating with default values",
                WeatherCheckError::AllSourcesUnavailable
            );
            NormalizedObservation::unavailable()
        });

        CascadeOutcome {
            observation,
            attempts,
        }
    }
}
