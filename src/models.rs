//! Data models for readings, anomalies and forecasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, ValidationError};

// ---

/// Telemetry payload as posted by a device to `POST /lora`.
///
/// Every field is optional at the wire level so that a missing field is
/// reported by [`ReadingPayload::validate`] rather than by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPayload {
    // ---
    pub device_id: Option<String>,
    pub timestamp: Option<i64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub power: Option<f64>,
    pub energy: Option<f64>,
    pub rssi: Option<f64>,
}

/// A validated sample, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    // ---
    pub device_id: String,
    pub timestamp: i64,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub energy: f64,
    pub rssi: f64,
}

/// Stored reading, as returned by the query endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    // ---
    pub id: Uuid,
    pub device_id: String,
    /// Device clock tick, not wall time.
    pub timestamp: i64,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub energy: f64,
    pub rssi: f64,
    /// Server-assigned receive time.
    pub received_at: DateTime<Utc>,
}

/// Externally detected power/voltage event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    // ---
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub power: Option<f64>,
    pub voltage: Option<f64>,
    #[serde(rename = "type")]
    #[sqlx(rename = "anomaly_type")]
    pub kind: Option<String>,
    pub detected_at: DateTime<Utc>,
}

/// Externally computed power forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    // ---
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub forecast: ForecastSeries,
}

/// Parallel arrays of predicted power, paired by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub power_watts: Vec<f64>,
}

/// Row shape of the `forecasts` table.
#[derive(Debug, sqlx::FromRow)]
pub struct ForecastRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub forecast_timestamps: Vec<DateTime<Utc>>,
    pub forecast_power_watts: Vec<f64>,
}

// ---

impl ReadingPayload {
    // ---
    /// Check that every required field is present.
    ///
    /// An empty `deviceId` counts as missing.
    pub fn validate(self) -> Result<NewReading, ValidationError> {
        // ---
        let device_id = self
            .device_id
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingField("deviceId"))?;

        Ok(NewReading {
            device_id,
            timestamp: self
                .timestamp
                .ok_or(ValidationError::MissingField("timestamp"))?,
            voltage: self.voltage.ok_or(ValidationError::MissingField("voltage"))?,
            current: self.current.ok_or(ValidationError::MissingField("current"))?,
            power: self.power.ok_or(ValidationError::MissingField("power"))?,
            energy: self.energy.ok_or(ValidationError::MissingField("energy"))?,
            rssi: self.rssi.ok_or(ValidationError::MissingField("rssi"))?,
        })
    }
}

impl ForecastSeries {
    // ---
    pub fn is_paired(&self) -> bool {
        self.timestamps.len() == self.power_watts.len()
    }
}

impl TryFrom<ForecastRow> for Forecast {
    type Error = StoreError;

    /// Rebuild a forecast from its row, refusing unpaired arrays.
    fn try_from(row: ForecastRow) -> Result<Self, Self::Error> {
        // ---
        let forecast = ForecastSeries {
            timestamps: row.forecast_timestamps,
            power_watts: row.forecast_power_watts,
        };
        if !forecast.is_paired() {
            return Err(StoreError::UnpairedForecast {
                id: row.id,
                timestamps: forecast.timestamps.len(),
                power_watts: forecast.power_watts.len(),
            });
        }

        Ok(Forecast {
            id: row.id,
            created_at: row.created_at,
            start_time: row.start_time,
            forecast,
        })
    }
}
