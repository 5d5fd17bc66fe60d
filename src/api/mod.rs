//! JSON API handlers

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::error::WeatherCheckError;
use crate::service::{CheckRequest, FlightCheckReport, WeatherCheckService};
use crate::stations::SiteReference;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherCheckService>,
}

#[derive(Serialize)]
pub struct ApiSite {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub station: Option<String>,
}

impl From<&SiteReference> for ApiSite {
    fn from(site: &SiteReference) -> Self {
        Self {
            id: site.id.clone(),
            name: site.name.clone(),
            latitude: site.coordinates.latitude(),
            longitude: site.coordinates.longitude(),
            station: site.station.clone(),
        }
    }
}

/// Error body: input problems are 400 with the message, everything else 500
pub struct ApiError(WeatherCheckError);

impl From<WeatherCheckError> for ApiError {
    fn from(err: WeatherCheckError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_invalid_input() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!("Flight check failed: {}", self.0);
            (StatusCode::INTERNAL_SERVER_ERROR, self.0.user_message())
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sites", get(get_sites))
        .route("/check", post(check))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_sites(State(state): State<AppState>) -> Json<Vec<ApiSite>> {
    Json(state.service.sites().iter().map(ApiSite::from).collect())
}

async fn check(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<FlightCheckReport>, ApiError> {
    let report = state.service.check(&request).await?;
    Ok(Json(report))
}
