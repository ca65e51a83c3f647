//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{GenerationError, TextGenerator};

// ---

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    // ---
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        // ---
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Extract the first candidate's text.
    pub fn parse_response(json: &Value) -> Result<String, GenerationError> {
        json.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                GenerationError::Parse("missing candidates[0].content.parts[0].text".to_string())
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    // ---
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        // ---
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::debug!("POST {} ({} prompt chars)", self.endpoint(), prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let json: Value = response.json().await?;
        Self::parse_response(&json)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new(
            "key-123",
            "gemini-1.5-flash",
            "https://generativelanguage.googleapis.com/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_response() {
        let raw = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "**Overall Status:** Stable." }] }
            }]
        });
        assert_eq!(
            GeminiClient::parse_response(&raw).unwrap(),
            "**Overall Status:** Stable."
        );
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            GeminiClient::parse_response(&raw),
            Err(GenerationError::Parse(_))
        ));
    }
}
