//! `GET /api/anomalies`: recent anomalies with a day of reading context.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{Anomaly, ApiError, AppState, Reading};

pub const ANOMALY_LIMIT: i64 = 50;
pub const CONTEXT_WINDOW_HOURS: i64 = 24;

// ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnomaliesResponse {
    anomalies: Vec<Anomaly>,
    context_readings: Vec<Reading>,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/anomalies", get(handler))
}

/// The two lists share a time window only; they are not joined.
async fn handler(State(state): State<AppState>) -> Result<Json<AnomaliesResponse>, ApiError> {
    // ---
    let anomalies = state
        .store
        .recent_anomalies(ANOMALY_LIMIT)
        .await
        .map_err(ApiError::query("anomalies"))?;

    let since = Utc::now() - Duration::hours(CONTEXT_WINDOW_HOURS);
    let context_readings = state
        .store
        .readings_since(since)
        .await
        .map_err(ApiError::query("anomalies"))?;

    debug!(
        "GET /api/anomalies - {} anomalies, {} context readings",
        anomalies.len(),
        context_readings.len()
    );

    Ok(Json(AnomaliesResponse {
        anomalies,
        context_readings,
    }))
}
