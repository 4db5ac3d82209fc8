use crate::errors::{MoltcheckError, MoltcheckResult};
use crate::providers::{strip_json_fence, ModelProvider};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_RETRIES: usize = 3;
const INITIAL_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 10_000;
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Concrete model backend over the Gemini `generateContent` REST API.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.8,
            max_output_tokens: 1024,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Map an HTTP failure status to a typed error. 429 becomes the
    /// provider-agnostic rate-limit signal with the retry-after header hint.
    async fn check_status(resp: reqwest::Response) -> MoltcheckResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let error_text = resp
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        if status.as_u16() == 429 {
            warn!(?retry_after, "model rate limit hit");
            return Err(MoltcheckError::RateLimit { retry_after });
        }

        let retryable = status.is_server_error();
        Err(MoltcheckError::Api {
            message: format!("model API error ({}): {}", status.as_u16(), error_text),
            hint: None,
            retryable,
        })
    }

    async fn generate_content(&self, system_prompt: &str, user_prompt: &str, as_json: bool) -> MoltcheckResult<String> {
        let mut generation_config = json!({
            "temperature": self.temperature,
            "maxOutputTokens": self.max_output_tokens,
        });
        if as_json {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": format!("{}\n\n{}", system_prompt, user_prompt)}],
            }],
            "generationConfig": generation_config,
        });

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut last_error: Option<MoltcheckError> = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let base = (INITIAL_DELAY_MS as f64
                    * BACKOFF_MULTIPLIER.powi(attempt as i32 - 1))
                .min(MAX_DELAY_MS as f64) as u64;
                // Jitter up to 25% to avoid thundering herd
                let jitter = (base as f64 * 0.25 * fastrand::f64()) as u64;
                warn!(
                    attempt,
                    delay_ms = base + jitter,
                    "retrying model request after error: {}",
                    last_error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_default()
                );
                tokio::time::sleep(Duration::from_millis(base + jitter)).await;
            }

            let result = async {
                let resp = self
                    .client
                    .post(&url)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| MoltcheckError::Api {
                        message: format!("model transport error: {}", e),
                        hint: None,
                        retryable: true,
                    })?;
                let resp = Self::check_status(resp).await?;
                let payload: Value = resp.json().await.map_err(|e| MoltcheckError::Api {
                    message: format!("failed to parse model response: {}", e),
                    hint: None,
                    retryable: false,
                })?;
                extract_text(&payload)
            }
            .await;

            match result {
                Ok(text) => {
                    debug!(model = %self.model, output_len = text.len(), "model generate ok");
                    return Ok(text);
                }
                // A rate limit is never retried transparently; backoff policy
                // for it belongs to the orchestration layer.
                Err(err @ MoltcheckError::RateLimit { .. }) => return Err(err),
                Err(err) if err.is_retryable() && attempt < MAX_RETRIES => {
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| MoltcheckError::Internal(anyhow::anyhow!("all retries failed"))))
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
fn extract_text(payload: &Value) -> MoltcheckResult<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| MoltcheckError::Validation("model response contained no text".into()))
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> MoltcheckResult<String> {
        self.generate_content(system_prompt, user_prompt, false).await
    }

    async fn generate_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> MoltcheckResult<Value> {
        let raw = self.generate_content(system_prompt, user_prompt, true).await?;
        serde_json::from_str(strip_json_fence(&raw)).map_err(|e| {
            MoltcheckError::Validation(format!("model returned malformed JSON: {}", e))
        })
    }
}
