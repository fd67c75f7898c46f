//! Ollama provider implementation.
//!
//! Talks to the native `/api/generate` endpoint with streaming disabled:
//! one POST per question, one JSON object back.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tabula_config::GenerationConfig;
use tabula_core::error::GenerationError;
use tabula_core::generation::{GenerationRequest, GenerationResponse, Generator};
use tracing::{debug, warn};

/// An Ollama text-generation provider.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for `model` served at `base_url`.
    ///
    /// `timeout_secs` bounds the whole request, connect through body.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, GenerationError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport {
                url: base_url.clone(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url,
            model: model.into(),
            timeout_secs,
            client,
        })
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        Self::new(&config.base_url, &config.model, config.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl Generator for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError> {
        let url = self.endpoint();
        let body = GenerationRequest {
            stream: false,
            ..request
        };

        debug!(model = %body.model, prompt_chars = body.prompt.len(), "Sending generation request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let detail = error_detail(&raw);
            warn!(status = status.as_u16(), body = %raw, "Ollama returned error");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                url,
                model: body.model,
                detail,
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let parsed: ApiGenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::Malformed(format!("{url}: {e}")))?;

        let text = parsed
            .response
            .ok_or_else(|| GenerationError::Malformed(format!("{url}: missing 'response' field")))?;

        Ok(GenerationResponse {
            response: text,
            model: parsed.model,
        })
    }
}

impl OllamaProvider {
    fn request_error(&self, url: &str, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            GenerationError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Prefer Ollama's `{"error": "..."}` message over the raw body.
fn error_detail(raw: &str) -> String {
    serde_json::from_str::<ApiError>(raw)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| raw.trim().to_string())
}

// --- Ollama API types (internal) ---

#[derive(Deserialize)]
struct ApiGenerateResponse {
    response: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: Option<String>,
}
