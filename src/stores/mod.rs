//! Storage seams for chunk records and document enumeration.
//!
//! The engine owns chunk records through the [`ChunkStore`] trait and reads
//! externally owned documents through [`DocumentSource`]; neither side holds
//! cross-references into the other. Two chunk-store backends ship here:
//!
//! - [`MemoryChunkStore`] for tests and single-process use
//! - [`SqliteChunkStore`] for persistence
//!
//! Both honor the same contract: `replace_chunks` swaps a document's chunk
//! set atomically (a concurrent reader sees the old set or the new set,
//! never a mixture or an empty gap), and `all_chunks` returns records in a
//! stable storage order so retrieval ties break deterministically.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ScoutError;

pub use memory::{MemoryChunkStore, MemoryDocumentSource};
pub use sqlite::SqliteChunkStore;

/// A chunk with its term vector, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique row id.
    pub id: String,
    /// Owning document.
    pub document_id: String,
    /// 0-based position within the document, contiguous per document.
    pub chunk_index: usize,
    /// Estimated page, 1-based.
    pub page_number: u32,
    pub text: String,
    /// Word -> term-frequency weight, derived deterministically from `text`.
    pub term_weights: FxHashMap<String, f64>,
}

impl ChunkRecord {
    /// Create a record with a fresh id and an empty term vector.
    pub fn new(
        document_id: impl Into<String>,
        chunk_index: usize,
        page_number: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            chunk_index,
            page_number,
            text: text.into(),
            term_weights: FxHashMap::default(),
        }
    }

    /// Attach the term vector.
    #[must_use]
    pub fn with_term_weights(mut self, term_weights: FxHashMap<String, f64>) -> Self {
        self.term_weights = term_weights;
        self
    }
}

/// A document as the index reads it: already-extracted text plus a declared
/// page count. Extraction from binary formats happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub text: String,
    pub page_count: u32,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, page_count: u32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            page_count,
        }
    }
}

/// Chunk persistence. The index is the sole writer.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Atomically replace every chunk of `document_id` with `chunks`.
    ///
    /// On failure the document's previous chunk set must remain intact.
    async fn replace_chunks(
        &self,
        document_id: &str,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), ScoutError>;

    /// Every stored chunk, in stable storage order.
    async fn all_chunks(&self) -> Result<Vec<ChunkRecord>, ScoutError>;

    /// A single document's chunks, ordered by chunk index.
    async fn chunks_for_document(&self, document_id: &str)
        -> Result<Vec<ChunkRecord>, ScoutError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, ScoutError>;
}

/// Enumerates the documents known to the system, for bulk reindexing.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ScoutError>;
}
