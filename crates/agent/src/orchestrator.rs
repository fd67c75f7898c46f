//! Answer orchestration — the question-answering flow.
//!
//! # Flow
//!
//! 1. Validate the question
//! 2. Resolve the target dataset (explicit ID, else the newest)
//! 3. Retrieve the best-matching rows
//! 4. Assemble them into a CONTEXT block
//! 5. Ask the generator, answering only from that context
//!
//! Generator failures degrade the answer instead of failing the call: the
//! caller still gets the retrieved sources.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tabula_config::RetrievalConfig;
use tabula_core::generation::{GenerationRequest, Generator};
use tabula_core::store::DatasetStore;
use tabula_core::{Dataset, Error, Result};
use tracing::{debug, info, warn};

use crate::context::ContextAssembler;
use crate::retrieval::{RetrievalOptions, Retriever};

/// Returned verbatim when no rows are available to answer from.
pub const DONT_KNOW_ANSWER: &str = "I don't know based on the uploaded dataset.";

/// Questions shorter than this (after trimming) are rejected.
pub const MIN_QUESTION_CHARS: usize = 2;

/// The answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// The dataset the question was answered against.
    pub dataset_id: String,
    /// `row_index` of every retrieved row, in retrieval order.
    pub sources: Vec<usize>,
}

/// Ingest, list, and ask over a dataset store.
///
/// Holds no mutable state, so one instance can serve many concurrent
/// callers.
pub struct Assistant {
    store: Arc<dyn DatasetStore>,
    generator: Arc<dyn Generator>,
    retriever: Retriever,
    assembler: ContextAssembler,
    limit: usize,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn DatasetStore>,
        generator: Arc<dyn Generator>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            retriever: Retriever::new(store.clone(), RetrievalOptions::from(config)),
            assembler: ContextAssembler::from_config(config),
            limit: config.limit,
            store,
            generator,
        }
    }

    pub fn store(&self) -> &Arc<dyn DatasetStore> {
        &self.store
    }

    /// Normalize an upload and store it as a new dataset.
    ///
    /// Nothing is written unless the whole file parses into at least one row.
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<Dataset> {
        let upload = tabula_ingest::normalize(filename, bytes)?;
        let dataset = self
            .store
            .create_dataset(upload.rows, filename, upload.file_type)
            .await?;
        Ok(dataset)
    }

    /// All datasets, newest first.
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        Ok(self.store.list_datasets().await?)
    }

    /// Answer `question` from one dataset.
    pub async fn ask(&self, question: &str, dataset_id: Option<&str>) -> Result<Answer> {
        let question = question.trim();
        if question.chars().count() < MIN_QUESTION_CHARS {
            return Err(Error::InvalidQuestion(format!(
                "question must be at least {MIN_QUESTION_CHARS} characters"
            )));
        }

        let dataset_id = self.resolve_dataset(dataset_id).await?;

        let scored = self
            .retriever
            .retrieve(&dataset_id, question, self.limit)
            .await?;

        if scored.is_empty() {
            debug!(dataset_id = %dataset_id, "No rows to answer from");
            return Ok(Answer {
                answer: DONT_KNOW_ANSWER.to_string(),
                dataset_id,
                sources: Vec::new(),
            });
        }

        let sources: Vec<usize> = scored.iter().map(|s| s.row.row_index).collect();
        let context = self.assembler.assemble(scored.iter().map(|s| &s.row));
        if context.truncated > 0 {
            debug!(
                included = context.included,
                truncated = context.truncated,
                "Context truncated to fit budget"
            );
        }

        let prompt = build_prompt(question, &context.text);
        let request = GenerationRequest::new(self.generator.model(), prompt);

        info!(
            dataset_id = %dataset_id,
            rows = sources.len(),
            generator = %self.generator.name(),
            model = %self.generator.model(),
            "Generating answer"
        );

        let answer = match self.generator.generate(request).await {
            Ok(response) => response.response.trim().to_string(),
            Err(e) => {
                warn!(dataset_id = %dataset_id, error = %e, "Generation failed");
                format!("Model call failed. {e}")
            }
        };

        Ok(Answer {
            answer,
            dataset_id,
            sources,
        })
    }

    async fn resolve_dataset(&self, requested: Option<&str>) -> Result<String> {
        match requested.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                if self.store.dataset_exists(id).await? {
                    Ok(id.to_string())
                } else {
                    Err(Error::DatasetNotFound {
                        dataset_id: id.to_string(),
                    })
                }
            }
            None => self
                .store
                .latest_dataset_id()
                .await?
                .ok_or(Error::NoDatasetAvailable),
        }
    }
}

/// The fixed instruction template sent to the generator.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a dataset QA assistant.\n\
         Answer only from the provided CONTEXT.\n\
         If the answer is not in context, reply exactly: '{DONT_KNOW_ANSWER}'\n\
         \n\
         QUESTION:\n\
         {question}\n\
         \n\
         CONTEXT:\n\
         {context}\n"
    )
}
