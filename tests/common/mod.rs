//! Shared harness for in-process router tests.
//!
//! `MemoryStore` stands in for PostgreSQL and the generators stand in for the
//! Gemini API, so the full router can be driven with `oneshot` requests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use powerwatch::{
    routes, Anomaly, AppState, Forecast, ForecastSeries, GenerationError, NewReading, Reading,
    StoreError, StoreResult, Summarizer, TelemetryStore, TextGenerator,
};

// ---

/// In-memory [`TelemetryStore`] with the same ordering rules as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    pub readings: Mutex<Vec<Reading>>,
    pub anomalies: Mutex<Vec<Anomaly>>,
    pub forecasts: Mutex<Vec<Forecast>>,
    /// When set, every operation fails like a dropped connection.
    pub fail: AtomicBool,
}

impl MemoryStore {
    fn check(&self) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn reading_count(&self) -> usize {
        self.readings.lock().unwrap().len()
    }
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    async fn insert_reading(&self, reading: NewReading) -> StoreResult<Reading> {
        self.check()?;
        let stored = Reading {
            id: Uuid::new_v4(),
            device_id: reading.device_id,
            timestamp: reading.timestamp,
            voltage: reading.voltage,
            current: reading.current,
            power: reading.power,
            energy: reading.energy,
            rssi: reading.rssi,
            received_at: Utc::now(),
        };
        self.readings.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn recent_readings(&self, limit: i64) -> StoreResult<Vec<Reading>> {
        self.check()?;
        let mut readings = self.readings.lock().unwrap().clone();
        readings.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        readings.truncate(limit as usize);
        Ok(readings)
    }

    async fn readings_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Reading>> {
        self.check()?;
        let mut readings: Vec<Reading> = self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.received_at >= since)
            .cloned()
            .collect();
        readings.sort_by(|a, b| a.received_at.cmp(&b.received_at));
        Ok(readings)
    }

    async fn recent_anomalies(&self, limit: i64) -> StoreResult<Vec<Anomaly>> {
        self.check()?;
        let mut anomalies = self.anomalies.lock().unwrap().clone();
        anomalies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        anomalies.truncate(limit as usize);
        Ok(anomalies)
    }

    async fn latest_forecast(&self) -> StoreResult<Option<Forecast>> {
        self.check()?;
        Ok(self
            .forecasts
            .lock()
            .unwrap()
            .iter()
            .max_by_key(|f| f.created_at)
            .cloned())
    }
}

/// Generator that records its prompts and returns a canned reply.
pub struct ScriptedGenerator {
    pub reply: String,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Generator that always fails as if the remote service were down.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "model overloaded".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

// ---

pub fn app(store: Arc<MemoryStore>, generator: Arc<dyn TextGenerator>) -> Router {
    routes::router(AppState::new(store, Summarizer::new(generator)))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// ---

pub fn reading_received_at(device_id: &str, tick: i64, received_at: DateTime<Utc>) -> Reading {
    Reading {
        id: Uuid::new_v4(),
        device_id: device_id.to_string(),
        timestamp: tick,
        voltage: 230.1,
        current: 1.5,
        power: 345.2,
        energy: 0.8,
        rssi: -81.0,
        received_at,
    }
}

pub fn anomaly_at(timestamp: DateTime<Utc>, power: f64) -> Anomaly {
    Anomaly {
        id: Uuid::new_v4(),
        timestamp,
        power: Some(power),
        voltage: Some(229.0),
        kind: Some("power_spike".to_string()),
        detected_at: timestamp + Duration::seconds(30),
    }
}

pub fn forecast_created_at(created_at: DateTime<Utc>, power_watts: Vec<f64>) -> Forecast {
    let start_time = created_at + Duration::minutes(5);
    Forecast {
        id: Uuid::new_v4(),
        created_at,
        start_time,
        forecast: ForecastSeries {
            timestamps: (0..power_watts.len() as i64)
                .map(|h| start_time + Duration::hours(h))
                .collect(),
            power_watts,
        },
    }
}
