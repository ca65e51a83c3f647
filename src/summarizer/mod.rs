//! AI summary of recent anomalies and the latest forecast.
//!
//! The [`Summarizer`] owns the prompt template and the fallback messages; the
//! actual text generation is delegated to a [`TextGenerator`] so the HTTP
//! layer can be exercised without a network.
//!
//! `summarize` never fails: missing inputs and generator errors both turn into
//! fixed user-facing strings.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Anomaly, Forecast};

mod gemini;

pub use gemini::GeminiClient;

pub const NOT_ENOUGH_DATA: &str = "Not enough data to generate a summary.";
pub const SUMMARY_UNAVAILABLE: &str = "Error: Could not generate AI summary at this time.";

// ---

/// Errors from a text-generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("failed to serialize prompt data: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Builds the analyst prompt and forwards it to a [`TextGenerator`].
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    // ---
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Produce a summary, or one of the fixed fallback messages.
    ///
    /// The generator is not called when there are no anomalies or no forecast.
    pub async fn summarize(&self, anomalies: &[Anomaly], forecast: Option<&Forecast>) -> String {
        // ---
        let forecast = match forecast {
            Some(f) if !anomalies.is_empty() => f,
            _ => {
                tracing::debug!("Skipping summary generation: missing anomalies or forecast");
                return NOT_ENOUGH_DATA.to_string();
            }
        };

        let result = match build_prompt(anomalies, forecast) {
            Ok(prompt) => self.generator.generate(&prompt).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => {
                tracing::info!(
                    "Generated summary with {} ({} chars)",
                    self.generator.name(),
                    text.len()
                );
                text
            }
            Err(e) => {
                tracing::error!("Error generating summary with {}: {}", self.generator.name(), e);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Render the analyst prompt for the given anomalies and forecast.
pub fn build_prompt(anomalies: &[Anomaly], forecast: &Forecast) -> Result<String, GenerationError> {
    // ---
    let anomaly_json = serde_json::to_string_pretty(anomalies)?;
    let start = forecast.start_time.format("%-m/%-d/%Y, %-I:%M:%S %p");
    let watts = forecast
        .forecast
        .power_watts
        .iter()
        // Halves round away from zero
        .map(|p| format!("{:.0}", p.round()))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "You are an expert energy analyst for a smart home. Your task is to provide a concise, \
insightful summary based on the following smart meter data.

Data Context:
- This data is from a single smart meter.
- Anomaly data points to unusual power spikes.
- Forecast data predicts future energy consumption.

Here is the anomaly data from the last 24 hours:
{anomaly_json}

Here is the power forecast for the next 6 hours:
- Forecast starts at: {start}
- Predicted Power (Watts): {watts}

Please provide a summary with the following structure:
- **Overall Status:** A single sentence summarizing the energy situation.
- **Key Observations:** 2-3 bullet points highlighting the most important findings from the \
anomalies and forecast (e.g., number of anomalies, when the highest power usage is predicted).
- **Recommendation:** One actionable recommendation for the homeowner (e.g., \"Consider \
shifting high-power tasks away from the predicted peak usage time around 8 PM.\").
"
    ))
}
