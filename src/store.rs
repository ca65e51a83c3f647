//! Persistence layer for readings, anomalies and forecasts.
//!
//! Handlers talk to the [`TelemetryStore`] trait; [`PgStore`] is the
//! PostgreSQL implementation used by the service binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Anomaly, Forecast, ForecastRow, NewReading, Reading};

pub type StoreResult<T> = Result<T, StoreError>;

// ---

/// Storage operations used by the HTTP handlers.
///
/// Readings are append-only; anomalies and forecasts are read-only here.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Append one reading, stamping it with the server receive time.
    async fn insert_reading(&self, reading: NewReading) -> StoreResult<Reading>;

    /// Most recently received readings, newest first.
    async fn recent_readings(&self, limit: i64) -> StoreResult<Vec<Reading>>;

    /// Readings received at or after `since`, oldest first.
    async fn readings_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Reading>>;

    /// Most recent anomalies by measurement time, newest first.
    async fn recent_anomalies(&self, limit: i64) -> StoreResult<Vec<Anomaly>>;

    /// The most recently created forecast, if any.
    async fn latest_forecast(&self) -> StoreResult<Option<Forecast>>;
}

/// PostgreSQL-backed [`TelemetryStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetryStore for PgStore {
    // ---
    async fn insert_reading(&self, reading: NewReading) -> StoreResult<Reading> {
        // ---
        let stored = sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO readings (
                id, device_id, timestamp,
                voltage, current, power, energy, rssi
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, device_id, timestamp, voltage, current,
                      power, energy, rssi, received_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&reading.device_id)
        .bind(reading.timestamp)
        .bind(reading.voltage)
        .bind(reading.current)
        .bind(reading.power)
        .bind(reading.energy)
        .bind(reading.rssi)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn recent_readings(&self, limit: i64) -> StoreResult<Vec<Reading>> {
        // ---
        let readings = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, device_id, timestamp, voltage, current,
                   power, energy, rssi, received_at
            FROM readings
            ORDER BY received_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(readings)
    }

    async fn readings_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Reading>> {
        // ---
        let readings = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, device_id, timestamp, voltage, current,
                   power, energy, rssi, received_at
            FROM readings
            WHERE received_at >= $1
            ORDER BY received_at ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(readings)
    }

    async fn recent_anomalies(&self, limit: i64) -> StoreResult<Vec<Anomaly>> {
        // ---
        let anomalies = sqlx::query_as::<_, Anomaly>(
            r#"
            SELECT id, timestamp, power, voltage, anomaly_type, detected_at
            FROM anomalies
            ORDER BY timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(anomalies)
    }

    async fn latest_forecast(&self) -> StoreResult<Option<Forecast>> {
        // ---
        let row = sqlx::query_as::<_, ForecastRow>(
            r#"
            SELECT id, created_at, start_time,
                   forecast_timestamps, forecast_power_watts
            FROM forecasts
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Forecast::try_from).transpose()
    }
}
