use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use uas_weather_check::api::AppState;
use uas_weather_check::{ReferenceTables, WeatherCheckConfig, WeatherCheckService, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = WeatherCheckConfig::load_from_path(config_path)?;

    logging::init(&config.logging)?;
    tracing::info!("Starting uas-weather-check {}", uas_weather_check::VERSION);

    let tables = Arc::new(ReferenceTables::load(&config.reference));
    let service = WeatherCheckService::from_config(&config, tables)?;

    let state = AppState {
        service: Arc::new(service),
    };
    web::run(&config.server, state).await
}
