//! Lexical retrieval over one dataset's rows.
//!
//! Scoring is deliberately simple: a row scores one point for every
//! question token (repeats included) found *anywhere* inside its
//! lowercased text.
//! Containment, not whole-word matching, so `"hre"` matches inside
//! `"three"`. Low precision is accepted in exchange for zero indexing.

use std::sync::Arc;
use tabula_config::RetrievalConfig;
use tabula_core::Row;
use tabula_core::error::StoreError;
use tabula_core::store::DatasetStore;
use tracing::debug;

/// A retrieved row and how many question tokens it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRow {
    pub row: Row,
    pub score: usize,
}

/// Tunables for [`rank_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    /// Rows scoring below this are discarded.
    pub min_score: usize,
    /// Question tokens shorter than this are ignored.
    pub min_token_len: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            min_score: 1,
            min_token_len: 3,
        }
    }
}

impl From<&RetrievalConfig> for RetrievalOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            min_score: config.min_score,
            min_token_len: config.min_token_len,
        }
    }
}

/// Lowercased ASCII-alphanumeric runs of at least `min_len` characters,
/// in question order. Repeats are kept; each one scores separately.
pub fn tokenize(question: &str, min_len: usize) -> Vec<String> {
    question
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty() && t.len() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Rank `rows` against `question`.
///
/// Returns at most `limit` rows, best score first, ties by `row_index`.
/// When nothing reaches `min_score`, the first `limit` rows by
/// `row_index` are returned with score 0 instead.
pub fn rank_rows(
    rows: Vec<Row>,
    question: &str,
    limit: usize,
    options: RetrievalOptions,
) -> Vec<ScoredRow> {
    if limit == 0 || rows.is_empty() {
        return Vec::new();
    }

    let tokens = tokenize(question, options.min_token_len);

    let mut scored: Vec<ScoredRow> = rows
        .iter()
        .filter_map(|row| {
            let text = row.text().to_lowercase();
            let score = tokens.iter().filter(|t| text.contains(t.as_str())).count();
            (score > 0 && score >= options.min_score).then(|| ScoredRow {
                row: row.clone(),
                score,
            })
        })
        .collect();

    if scored.is_empty() {
        debug!(tokens = tokens.len(), "No row matched, falling back to leading rows");
        let mut fallback = rows;
        fallback.sort_by_key(|r| r.row_index);
        fallback.truncate(limit);
        return fallback
            .into_iter()
            .map(|row| ScoredRow { row, score: 0 })
            .collect();
    }

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.row.row_index.cmp(&b.row.row_index))
    });
    scored.truncate(limit);
    debug!(
        tokens = tokens.len(),
        matched = scored.len(),
        top_score = scored[0].score,
        "Rows ranked"
    );
    scored
}

/// Store-backed retrieval.
pub struct Retriever {
    store: Arc<dyn DatasetStore>,
    options: RetrievalOptions,
}

impl Retriever {
    pub fn new(store: Arc<dyn DatasetStore>, options: RetrievalOptions) -> Self {
        Self { store, options }
    }

    /// Best rows of `dataset_id` for `question`, never more than `limit`.
    ///
    /// Read-only: the store connection is released before ranking starts.
    pub async fn retrieve(
        &self,
        dataset_id: &str,
        question: &str,
        limit: usize,
    ) -> Result<Vec<ScoredRow>, StoreError> {
        let rows = self.store.fetch_rows(dataset_id).await?;
        Ok(rank_rows(rows, question, limit, self.options))
    }
}
