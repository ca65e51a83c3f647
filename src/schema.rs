//! Database schema management for `powerwatch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).
//!
//! The `anomalies` and `forecasts` tables are written by external producers;
//! this service only reads them, but owns their definition so a fresh database
//! is usable immediately.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // One row per ingested sample, served by `/data`
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            id          UUID             PRIMARY KEY,
            device_id   TEXT             NOT NULL CHECK (device_id <> ''),
            timestamp   BIGINT           NOT NULL,
            voltage     DOUBLE PRECISION NOT NULL,
            current     DOUBLE PRECISION NOT NULL,
            power       DOUBLE PRECISION NOT NULL,
            energy      DOUBLE PRECISION NOT NULL,
            rssi        DOUBLE PRECISION NOT NULL,
            received_at TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS anomalies (
            id           UUID             PRIMARY KEY DEFAULT gen_random_uuid(),
            timestamp    TIMESTAMPTZ      NOT NULL,
            power        DOUBLE PRECISION,
            voltage      DOUBLE PRECISION,
            anomaly_type TEXT,
            detected_at  TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Forecast series are stored as parallel arrays paired by position
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS forecasts (
            id                   UUID               PRIMARY KEY DEFAULT gen_random_uuid(),
            created_at           TIMESTAMPTZ        NOT NULL,
            start_time           TIMESTAMPTZ        NOT NULL,
            forecast_timestamps  TIMESTAMPTZ[]      NOT NULL DEFAULT '{}',
            forecast_power_watts DOUBLE PRECISION[] NOT NULL DEFAULT '{}',
            CHECK (cardinality(forecast_timestamps) = cardinality(forecast_power_watts))
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Descending-time indexes for the recency queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_readings_received_at
            ON readings (received_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_anomalies_timestamp
            ON anomalies (timestamp DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_forecasts_created_at
            ON forecasts (created_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
