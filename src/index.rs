//! The chunk index: owns rebuilds, top-k retrieval, and aggregate stats.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::chunking::Chunker;
use crate::clock::Clock;
use crate::config::IndexConfig;
use crate::query::QueryIntent;
use crate::scoring;
use crate::stores::{ChunkRecord, ChunkStore, DocumentSource};
use crate::text::vectorize;
use crate::types::ScoutError;

/// Aggregate counters, recomputed after every full rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub last_rebuild: Option<DateTime<Utc>>,
}

/// Outcome of a full rebuild. A document that failed still counts toward
/// `processed`; the message says whether everything went cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildReport {
    pub message: String,
    pub processed: usize,
    pub total: usize,
}

/// A chunk together with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub record: ChunkRecord,
    pub score: f64,
}

/// Owns the chunk collection per document and retrieval over it.
///
/// The index is the sole writer of chunk records: ingestion and rebuilds go
/// through [`rebuild_document`](Self::rebuild_document), retrieval through
/// [`top_k`](Self::top_k).
pub struct ChunkIndex {
    chunker: Chunker,
    store: Arc<dyn ChunkStore>,
    documents: Arc<dyn DocumentSource>,
    relevance_threshold: f64,
    clock: Arc<dyn Clock>,
    stats: RwLock<IndexStats>,
}

impl ChunkIndex {
    pub fn new(
        config: &IndexConfig,
        store: Arc<dyn ChunkStore>,
        documents: Arc<dyn DocumentSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chunker: Chunker::new(config.chunk_size, config.chunk_overlap),
            store,
            documents,
            relevance_threshold: config.relevance_threshold,
            clock,
            stats: RwLock::new(IndexStats::default()),
        }
    }

    /// Re-chunk and re-vectorize one document, replacing its chunk set.
    ///
    /// Replacement is atomic at the store level: on failure the document
    /// keeps its previous chunks.
    pub async fn rebuild_document(
        &self,
        document_id: &str,
        text: &str,
        page_count: u32,
    ) -> Result<(), ScoutError> {
        let chunks = build_chunk_records(&self.chunker, document_id, text, page_count);
        debug!(document_id, chunks = chunks.len(), "replacing document chunks");
        self.store.replace_chunks(document_id, chunks).await
    }

    /// Rebuild every known document, fanning out one task per document and
    /// joining them all before reporting.
    ///
    /// A failing document is logged and counted but never aborts the batch
    /// or touches other documents. Stats are recomputed once the barrier is
    /// passed.
    pub async fn rebuild_all(&self) -> Result<RebuildReport, ScoutError> {
        let documents = self.documents.list_documents().await?;
        let total = documents.len();
        if total == 0 {
            return Ok(RebuildReport {
                message: "No documents to rebuild".to_string(),
                processed: 0,
                total: 0,
            });
        }

        let mut tasks = JoinSet::new();
        for document in documents {
            let store = Arc::clone(&self.store);
            let chunker = self.chunker.clone();
            tasks.spawn(async move {
                let chunks =
                    build_chunk_records(&chunker, &document.id, &document.text, document.page_count);
                let outcome = store.replace_chunks(&document.id, chunks).await;
                (document.id, outcome)
            });
        }

        let mut failed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((document_id, Ok(()))) => {
                    debug!(document_id = %document_id, "document reindexed");
                }
                Ok((document_id, Err(err))) => {
                    failed += 1;
                    warn!(document_id = %document_id, error = %err, "document rebuild failed");
                }
                Err(err) => {
                    failed += 1;
                    warn!(error = %err, "rebuild task aborted");
                }
            }
        }

        let total_chunks = self.store.count().await?;
        {
            let mut stats = self.stats.write();
            stats.total_documents = total;
            stats.total_chunks = total_chunks;
            stats.last_rebuild = Some(self.clock.now());
        }

        let message = if failed == 0 {
            "Index rebuild completed"
        } else {
            "Index rebuild completed with errors"
        };
        info!(processed = total, total, failed, total_chunks, "index rebuild finished");
        Ok(RebuildReport {
            message: message.to_string(),
            processed: total,
            total,
        })
    }

    /// Score every stored chunk against the expanded query terms and return
    /// the best `k`, dropping anything at or below the relevance threshold.
    /// Ties keep the store's stable order.
    pub async fn top_k(
        &self,
        query_terms: &[String],
        k: usize,
        intent: QueryIntent,
    ) -> Result<Vec<ScoredChunk>, ScoutError> {
        let chunks = self.store.all_chunks().await?;
        let candidates = chunks.len();

        let mut scored: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|record| {
                let score = scoring::score(query_terms, &record.text, intent);
                ScoredChunk { record, score }
            })
            .filter(|chunk| chunk.score > self.relevance_threshold)
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        debug!(candidates, kept = scored.len(), k, "scored chunks");
        Ok(scored)
    }

    /// Snapshot of the aggregate counters.
    pub fn stats(&self) -> IndexStats {
        self.stats.read().clone()
    }
}

/// Chunk a document and attach a term vector to every chunk.
fn build_chunk_records(
    chunker: &Chunker,
    document_id: &str,
    text: &str,
    page_count: u32,
) -> Vec<ChunkRecord> {
    chunker
        .split(text, page_count)
        .into_iter()
        .map(|draft| {
            let weights = vectorize(&draft.text);
            ChunkRecord::new(document_id, draft.index, draft.page, draft.text)
                .with_term_weights(weights)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::stores::{DocumentRecord, MemoryChunkStore, MemoryDocumentSource};

    fn index_with(
        store: Arc<dyn ChunkStore>,
        documents: Arc<MemoryDocumentSource>,
    ) -> ChunkIndex {
        let config = IndexConfig::default().with_chunk_size(80).with_chunk_overlap(20);
        ChunkIndex::new(
            &config,
            store,
            documents,
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    #[tokio::test]
    async fn rebuild_document_populates_the_store() {
        let store = Arc::new(MemoryChunkStore::new());
        let index = index_with(store.clone(), Arc::new(MemoryDocumentSource::new()));

        index
            .rebuild_document("doc", "Search engines rank documents by relevance.", 1)
            .await
            .unwrap();

        let chunks = store.chunks_for_document("doc").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert!(!chunks[0].term_weights.is_empty());
    }

    #[tokio::test]
    async fn top_k_filters_sorts_and_truncates() {
        let store = Arc::new(MemoryChunkStore::new());
        let index = index_with(store.clone(), Arc::new(MemoryDocumentSource::new()));

        index
            .rebuild_document("a", "Retrieval engines score chunks for retrieval.", 1)
            .await
            .unwrap();
        index
            .rebuild_document("b", "Nothing to see in this garden of tomatoes.", 1)
            .await
            .unwrap();
        index
            .rebuild_document("c", "Engines exist.", 1)
            .await
            .unwrap();

        let terms = vec!["retrieval".to_string(), "engines".to_string()];
        let top = index.top_k(&terms, 2, QueryIntent::General).await.unwrap();

        assert!(!top.is_empty());
        assert!(top.len() <= 2);
        // Descending scores.
        for window in top.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
        // The tomato chunk has no matching terms and cannot clear the threshold.
        assert!(top.iter().all(|c| c.record.document_id != "b"));
        assert_eq!(top[0].record.document_id, "a");
    }

    #[tokio::test]
    async fn rebuild_all_updates_stats() {
        let store = Arc::new(MemoryChunkStore::new());
        let documents = Arc::new(MemoryDocumentSource::new());
        documents.upsert(DocumentRecord::new("a", "First document text.", 1));
        documents.upsert(DocumentRecord::new("b", "Second document text.", 1));
        let index = index_with(store.clone(), documents);

        assert_eq!(index.stats(), IndexStats::default());

        let report = index.rebuild_all().await.unwrap();
        assert_eq!(report.message, "Index rebuild completed");
        assert_eq!(report.processed, 2);
        assert_eq!(report.total, 2);

        let stats = index.stats();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_chunks, store.count().await.unwrap());
        assert!(stats.last_rebuild.is_some());
    }

    #[tokio::test]
    async fn rebuild_all_with_no_documents_reports_zero() {
        let index = index_with(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(MemoryDocumentSource::new()),
        );
        let report = index.rebuild_all().await.unwrap();
        assert_eq!(report.message, "No documents to rebuild");
        assert_eq!((report.processed, report.total), (0, 0));
        // Stats stay untouched until a real rebuild happens.
        assert!(index.stats().last_rebuild.is_none());
    }
}
