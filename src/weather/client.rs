//! Shared HTTP client for all upstream weather services

use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::SourcesConfig;
use crate::error::WeatherCheckError;

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Thin wrapper over `reqwest::Client` with a bounded timeout and latency logging.
///
/// Requests are sent exactly once; a failure is reported to the caller, which moves on
/// to the next source instead of retrying.
#[derive(Clone, Debug)]
pub struct SourceClient {
    client: Client,
}

impl SourceClient {
    /// Create a client using the configured timeout and user agent
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WeatherCheckError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text; non-2xx statuses are errors
    #[instrument(level = "debug", skip(self))]
    pub async fn get_text(&self, url: &str) -> anyhow::Result<String> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(anyhow!("{url} returned HTTP {status}"));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        let total_duration = start_time.elapsed();
        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow API response detected: {:.3}s for {}",
                total_duration.as_secs_f64(),
                url
            );
        } else {
            info!(
                "Retrieved {} bytes in {:.3}s",
                body.len(),
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}
