//! Route gateway: merges every endpoint subrouter and attaches shared state.

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

mod anomalies;
mod forecast;
mod health;
mod ingest;
mod readings;
mod summary;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(ingest::router())
        .merge(readings::router())
        .merge(anomalies::router())
        .merge(forecast::router())
        .merge(summary::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
