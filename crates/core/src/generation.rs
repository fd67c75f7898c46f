//! Generator trait — the abstraction over the text-generation collaborator.
//!
//! The wire contract is fixed: a request carries `{model, prompt, stream}`
//! and a successful response carries `{response}`. Everything else about
//! the collaborator is outside this crate's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// A single, non-streaming generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "mistral", "llama3")
    pub model: String,

    /// Fully rendered prompt
    pub prompt: String,

    /// Always false; answers are returned whole
    #[serde(default)]
    pub stream: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }
}

/// A successful generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated text
    pub response: String,

    /// Which model actually responded, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The core Generator trait.
///
/// One attempt per call; implementations must not retry.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "ollama").
    fn name(&self) -> &str;

    /// The model requests should name.
    fn model(&self) -> &str;

    /// Send a request and get the complete response.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError>;
}
