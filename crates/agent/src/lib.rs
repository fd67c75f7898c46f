//! Retrieval and answer orchestration for Tabula.
//!
//! A question is answered in three steps:
//!
//! 1. **Retrieve** the best-matching rows of one dataset ([`retrieval`])
//! 2. **Assemble** them into a bounded CONTEXT block ([`context`])
//! 3. **Generate** an answer restricted to that context ([`orchestrator`])
//!
//! [`Assistant`] ties the steps together and also fronts ingestion.

pub mod context;
pub mod orchestrator;
pub mod retrieval;

#[cfg(test)]
mod test_helpers;

pub use context::{AssembledContext, ContextAssembler};
pub use orchestrator::{Answer, Assistant, DONT_KNOW_ANSWER, build_prompt};
pub use retrieval::{RetrievalOptions, Retriever, ScoredRow, rank_rows, tokenize};
