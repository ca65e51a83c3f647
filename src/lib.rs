//! `powerwatch` – smart-meter telemetry ingestion and analytics backend.
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): each module
//! exposes a small surface and `routes` only knows about the items re-exported
//! here.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod summarizer;

pub use config::Config;
pub use error::{ApiError, StoreError, ValidationError};
pub use models::{Anomaly, Forecast, ForecastSeries, NewReading, Reading, ReadingPayload};
pub use store::{PgStore, StoreResult, TelemetryStore};
pub use summarizer::{GeminiClient, GenerationError, Summarizer, TextGenerator};

// ---

/// Dependencies shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TelemetryStore>,
    pub summarizer: Summarizer,
}

impl AppState {
    pub fn new(store: Arc<dyn TelemetryStore>, summarizer: Summarizer) -> Self {
        Self { store, summarizer }
    }
}
