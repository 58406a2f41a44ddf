//! In-memory chunk store and document source.

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{ChunkRecord, ChunkStore, DocumentRecord, DocumentSource};
use crate::types::ScoutError;

#[derive(Debug, Clone)]
struct StoredChunk {
    seq: u64,
    record: ChunkRecord,
}

#[derive(Debug, Default)]
struct Inner {
    chunks: FxHashMap<String, Vec<StoredChunk>>,
    next_seq: u64,
}

/// Chunk store backed by a process-local map.
///
/// Replacement happens under a single write-lock acquisition, so readers see
/// either the old chunk set or the new one. Each stored chunk gets a
/// monotonically increasing sequence number; `all_chunks` sorts by it, which
/// fixes the stable order retrieval ties break on.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    inner: RwLock<Inner>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn replace_chunks(
        &self,
        document_id: &str,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), ScoutError> {
        let mut inner = self.inner.write();
        let stored = chunks
            .into_iter()
            .map(|record| {
                let seq = inner.next_seq;
                inner.next_seq += 1;
                StoredChunk { seq, record }
            })
            .collect();
        inner.chunks.insert(document_id.to_string(), stored);
        Ok(())
    }

    async fn all_chunks(&self) -> Result<Vec<ChunkRecord>, ScoutError> {
        let inner = self.inner.read();
        let mut stored: Vec<StoredChunk> = inner.chunks.values().flatten().cloned().collect();
        stored.sort_by_key(|chunk| chunk.seq);
        Ok(stored.into_iter().map(|chunk| chunk.record).collect())
    }

    async fn chunks_for_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<ChunkRecord>, ScoutError> {
        let inner = self.inner.read();
        let mut records: Vec<ChunkRecord> = inner
            .chunks
            .get(document_id)
            .map(|stored| stored.iter().map(|chunk| chunk.record.clone()).collect())
            .unwrap_or_default();
        records.sort_by_key(|record| record.chunk_index);
        Ok(records)
    }

    async fn count(&self) -> Result<usize, ScoutError> {
        let inner = self.inner.read();
        Ok(inner.chunks.values().map(Vec::len).sum())
    }
}

/// Document source backed by a process-local list, for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    documents: RwLock<Vec<DocumentRecord>>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a document by id.
    pub fn upsert(&self, document: DocumentRecord) {
        let mut documents = self.documents.write();
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ScoutError> {
        Ok(self.documents.read().clone())
    }
}
