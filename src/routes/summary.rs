//! `GET /api/summary`: AI-written digest of anomalies and the forecast.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use crate::{ApiError, AppState};

pub const SUMMARY_ANOMALY_LIMIT: i64 = 10;

// ---

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: String,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/summary", get(handler))
}

/// Generation failures are folded into the summary text by the summarizer,
/// so only storage errors reach the client as a 500.
async fn handler(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    // ---
    info!("GET /api/summary - gathering inputs");

    let anomalies = state
        .store
        .recent_anomalies(SUMMARY_ANOMALY_LIMIT)
        .await
        .map_err(ApiError::query("summary"))?;

    let forecast = state
        .store
        .latest_forecast()
        .await
        .map_err(ApiError::query("summary"))?;

    let summary = state
        .summarizer
        .summarize(&anomalies, forecast.as_ref())
        .await;

    Ok(Json(SummaryResponse { summary }))
}
