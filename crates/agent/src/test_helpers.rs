//! Shared test helpers.

use tabula_core::error::GenerationError;
use tabula_core::generation::{GenerationRequest, GenerationResponse, Generator};
use std::sync::Mutex;

enum Script {
    Replies(Vec<String>),
    Fail(GenerationError),
}

/// A generator that returns scripted replies in order, or always fails.
///
/// Panics if asked for more replies than were scripted.
pub struct ScriptedGenerator {
    model: String,
    script: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            model: "mock-model".into(),
            script: Script::Replies(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self {
            model: "mock-model".into(),
            script: Script::Fail(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };

        match &self.script {
            Script::Fail(error) => Err(error.clone()),
            Script::Replies(replies) => {
                let Some(reply) = replies.get(call) else {
                    panic!(
                        "ScriptedGenerator: no more replies (call #{call}, have {})",
                        replies.len()
                    );
                };
                Ok(GenerationResponse {
                    response: reply.clone(),
                    model: Some(self.model.clone()),
                })
            }
        }
    }
}
