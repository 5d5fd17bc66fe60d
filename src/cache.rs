//! Bounded in-memory cache for gridded hourly forecasts
//!
//! Entries are keyed by the forecast grid that was fetched (`OUN/43,34`), expire after a
//! fixed time-to-live and are evicted once `max_entries` is reached. The cache is an
//! ordinary value handed to the gridded adapter, so tests and callers can build,
//! share or invalidate it explicitly.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::config::CacheConfig;
use crate::stations::ForecastOffice;
use crate::weather::nws::HourlyPeriod;

#[derive(Clone)]
pub struct ForecastCache {
    entries: Cache<String, Arc<Vec<HourlyPeriod>>>,
}

impl ForecastCache {
    #[must_use]
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.max_entries,
            Duration::from_secs(u64::from(config.ttl_minutes) * 60),
        )
    }

    #[tracing::instrument(
        name = "query_cache",
        level = "debug",
        skip_all,
        fields(grid = %office.grid_label())
    )]
    pub async fn get(&self, office: &ForecastOffice) -> Option<Arc<Vec<HourlyPeriod>>> {
        let hit = self.entries.get(&office.grid_label()).await;
        debug!(hit = hit.is_some(), "Gridded forecast cache lookup");
        hit
    }

    pub async fn put(&self, office: &ForecastOffice, periods: Arc<Vec<HourlyPeriod>>) {
        self.entries.insert(office.grid_label(), periods).await;
    }

    /// Drop the entry for one grid
    pub async fn invalidate(&self, office: &ForecastOffice) {
        self.entries.invalidate(&office.grid_label()).await;
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}
