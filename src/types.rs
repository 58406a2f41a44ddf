//! Shared error and response types for the retrieval engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::QueryIntent;

/// Errors surfaced by the retrieval engine.
///
/// Validation failures are rejected before any pipeline work runs. Storage
/// failures propagate from the chunk store without local recovery; a failing
/// request or document never affects its concurrent siblings.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Request rejected before any work was performed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The chunk store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Persisted data could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One cited source backing an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub document_id: String,
    pub page_number: u32,
    pub chunk_index: usize,
    /// Leading excerpt of the chunk text, at most 150 characters plus an
    /// ellipsis marker.
    pub snippet: String,
    /// Relevance score rendered with two decimal places.
    pub relevance_score: String,
    pub intent: QueryIntent,
}

/// Full payload of an answered query.
///
/// This is both the ask-call return value and the unit stored in the
/// [`ResultCache`](crate::cache::ResultCache); `cached` is `false` on the
/// response that computed the answer and `true` on responses served from the
/// cache within the TTL window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub query: String,
    pub answer: String,
    /// Ranked citations, at most the configured `max_sources` entries.
    pub sources: Vec<SourceRef>,
    pub cached: bool,
    pub query_intent: QueryIntent,
}
