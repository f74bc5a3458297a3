//! Core traits for linkweave abstractions.
//!
//! These traits are the seams between the orchestrator and the outside
//! world: LLM providers, the RAG provider, and the document store.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::{CandidateDocument, DocumentId, RagSource};

// =============================================================================
// PROVIDER TRAITS
// =============================================================================

/// LLM backend that answers a suggestion prompt with a JSON document.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    /// Send the prompt and return the parsed JSON the model produced.
    ///
    /// One network call, no retries.
    async fn get_suggestions(&self, prompt: &str) -> Result<JsonValue>;

    /// Provider identifier used in logs (e.g. "gemini").
    fn provider_name(&self) -> &str;
}

/// Retrieval backend that finds external sources for a query.
#[async_trait]
pub trait SourceBackend: Send + Sync {
    /// Look up sources for the query, deduplicated and capped.
    async fn get_sources(&self, query: &str) -> Result<Vec<RagSource>>;
}

// =============================================================================
// CORPUS TRAITS
// =============================================================================

/// Supplier of linkable documents.
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    /// Published documents, excluding `exclude_id`.
    async fn candidates(&self, exclude_id: &DocumentId) -> Result<Vec<CandidateDocument>>;
}
