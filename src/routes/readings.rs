//! `GET /data`: the most recently received readings.

use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use crate::{ApiError, AppState, Reading};

pub const RECENT_READINGS_LIMIT: i64 = 50;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/data", get(handler))
}

/// Ordered by receive time, not by the device clock.
async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, ApiError> {
    // ---
    let readings = state
        .store
        .recent_readings(RECENT_READINGS_LIMIT)
        .await
        .map_err(ApiError::query("data"))?;

    debug!("GET /data - returning {} readings", readings.len());
    Ok(Json(readings))
}
