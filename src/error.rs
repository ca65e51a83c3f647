//! Error taxonomy for the HTTP layer and its collaborators.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// ---

/// Rejected telemetry payload.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Failure inside the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("forecast {id} has {timestamps} timestamps but {power_watts} power values")]
    UnpairedForecast {
        id: Uuid,
        timestamps: usize,
        power_watts: usize,
    },
}

/// Errors returned by request handlers.
///
/// Every variant maps to HTTP 500; the variant only decides the body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to store reading: {0}")]
    Ingest(#[source] StoreError),

    #[error("failed to query {what}: {source}")]
    Query {
        what: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn query(what: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Query { what, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let body = match &self {
            ApiError::Validation(e) => {
                tracing::error!("Rejected telemetry payload: {}", e);
                json!({ "message": "Error storing data", "error": e.to_string() })
            }
            ApiError::Ingest(e) => {
                tracing::error!("Failed to store data: {}", e);
                json!({ "message": "Error storing data", "error": e.to_string() })
            }
            ApiError::Query { what, source } => {
                tracing::error!("Failed to fetch {}: {}", what, source);
                json!({ "message": format!("Error fetching {what}") })
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_every_api_error_is_a_server_error() {
        // ---
        let errors = [
            ApiError::Validation(ValidationError::MissingField("voltage")),
            ApiError::Ingest(StoreError::Database(sqlx::Error::PoolTimedOut)),
            ApiError::query("data")(StoreError::Database(sqlx::Error::PoolClosed)),
        ];
        for err in errors {
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_validation_message_names_the_field() {
        let err = ValidationError::MissingField("deviceId");
        assert_eq!(err.to_string(), "missing required field `deviceId`");
    }
}
