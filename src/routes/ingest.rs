//! `POST /lora`: telemetry ingestion from metering devices.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{ApiError, AppState, ReadingPayload, ValidationError};

// ---

#[derive(Debug, Serialize)]
struct IngestResponse {
    message: &'static str,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/lora", post(handler))
}

/// Validate one sample and append it to the readings table.
///
/// Duplicate deliveries are stored as separate readings.
async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<ReadingPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    // ---
    let Json(payload) = payload.map_err(|e| ValidationError::Malformed(e.body_text()))?;
    debug!("POST /lora - payload: {:?}", payload);

    let reading = payload.validate()?;
    let stored = state
        .store
        .insert_reading(reading)
        .await
        .map_err(ApiError::Ingest)?;

    info!(
        device_id = %stored.device_id,
        power = stored.power,
        "Stored reading {}",
        stored.id
    );

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            message: "Data received and stored successfully!",
        }),
    ))
}
