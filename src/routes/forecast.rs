//! `GET /api/forecast`: latest forecast plus the last six hours of readings.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{ApiError, AppState, Forecast, Reading};

pub const RECENT_WINDOW_HOURS: i64 = 6;

// ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastResponse {
    /// `null` when no forecast has been written yet.
    forecast: Option<Forecast>,
    recent_readings: Vec<Reading>,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/forecast", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<ForecastResponse>, ApiError> {
    // ---
    let forecast = state
        .store
        .latest_forecast()
        .await
        .map_err(ApiError::query("forecast"))?;

    let since = Utc::now() - Duration::hours(RECENT_WINDOW_HOURS);
    let recent_readings = state
        .store
        .readings_since(since)
        .await
        .map_err(ApiError::query("forecast"))?;

    debug!(
        "GET /api/forecast - forecast present: {}, {} recent readings",
        forecast.is_some(),
        recent_readings.len()
    );

    Ok(Json(ForecastResponse {
        forecast,
        recent_readings,
    }))
}
