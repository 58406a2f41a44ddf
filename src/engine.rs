//! The ask pipeline: cache, analysis, retrieval, and answer assembly wired
//! together behind one entry point.

use std::sync::Arc;

use tracing::debug;

use crate::answer::{self, truncate_chars};
use crate::cache::ResultCache;
use crate::clock::{Clock, SystemClock};
use crate::config::IndexConfig;
use crate::index::{ChunkIndex, IndexStats, RebuildReport};
use crate::query::{QueryAnalyzer, QueryConfig};
use crate::stores::{ChunkStore, DocumentSource};
use crate::types::{AskResponse, ScoutError, SourceRef};

/// End-to-end retrieval engine over an injected chunk store and document
/// source.
///
/// Ask requests run concurrently and independently; the only shared state
/// is behind the store, cache, and stats locks. Two concurrent misses on the
/// same query may both compute an answer; whichever is stored first owns the
/// cache window.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use knowledgescout::engine::ScoutEngine;
/// use knowledgescout::stores::{MemoryChunkStore, MemoryDocumentSource};
///
/// # async fn run() -> Result<(), knowledgescout::types::ScoutError> {
/// let engine = ScoutEngine::builder()
///     .store(Arc::new(MemoryChunkStore::new()))
///     .documents(Arc::new(MemoryDocumentSource::new()))
///     .build();
///
/// engine.rebuild_document("intro", "Rust is a systems language.", 1).await?;
/// let response = engine.ask("What is Rust?", 3).await?;
/// println!("{}", response.answer);
/// # Ok(())
/// # }
/// ```
pub struct ScoutEngine {
    config: IndexConfig,
    analyzer: QueryAnalyzer,
    index: ChunkIndex,
    cache: ResultCache,
}

impl ScoutEngine {
    /// Start building an engine; the chunk store and document source are
    /// required.
    pub fn builder() -> ScoutEngineBuilder {
        ScoutEngineBuilder::default()
    }

    /// Answer a query from the indexed chunks.
    ///
    /// Validation happens before any work: the query must be non-empty and
    /// `k` between 1 and 10. A cached answer within its TTL is returned
    /// as-is with `cached = true`; otherwise the full pipeline runs (expand,
    /// classify, retrieve, compose) and the fresh answer is cached.
    ///
    /// Finding nothing is not an error: the answer falls back to a fixed
    /// sentinel and the source list is empty.
    pub async fn ask(&self, query: &str, k: usize) -> Result<AskResponse, ScoutError> {
        if query.trim().is_empty() {
            return Err(ScoutError::Validation("query must not be empty".to_string()));
        }
        if !(1..=10).contains(&k) {
            return Err(ScoutError::Validation(format!(
                "k must be between 1 and 10, got {k}"
            )));
        }

        if let Some(cached) = self.cache.get(query) {
            debug!(query, "served from cache");
            return Ok(cached);
        }

        let terms = self.analyzer.expand(query);
        let intent = self.analyzer.classify_intent(query);
        debug!(query, %intent, terms = terms.len(), "analyzed query");

        let ranked = self.index.top_k(&terms, k, intent).await?;
        let answer = answer::compose(&ranked, intent);

        let sources = ranked
            .iter()
            .take(self.config.max_sources)
            .map(|chunk| SourceRef {
                document_id: chunk.record.document_id.clone(),
                page_number: chunk.record.page_number,
                chunk_index: chunk.record.chunk_index,
                snippet: format!("{}...", truncate_chars(&chunk.record.text, 150)),
                relevance_score: format!("{:.2}", chunk.score),
                intent,
            })
            .collect();

        let response = AskResponse {
            query: query.to_string(),
            answer,
            sources,
            cached: false,
            query_intent: intent,
        };
        self.cache.put(query, response.clone());
        Ok(response)
    }

    /// Ingest or re-ingest one document's extracted text.
    pub async fn rebuild_document(
        &self,
        document_id: &str,
        text: &str,
        page_count: u32,
    ) -> Result<(), ScoutError> {
        if page_count < 1 {
            return Err(ScoutError::Validation(
                "page count must be at least 1".to_string(),
            ));
        }
        self.index.rebuild_document(document_id, text, page_count).await
    }

    /// Rebuild the chunk sets of every known document.
    pub async fn rebuild_all(&self) -> Result<RebuildReport, ScoutError> {
        self.index.rebuild_all().await
    }

    /// Current aggregate counters.
    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }
}

/// Builder for [`ScoutEngine`].
#[derive(Default)]
pub struct ScoutEngineBuilder {
    config: IndexConfig,
    query_config: QueryConfig,
    store: Option<Arc<dyn ChunkStore>>,
    documents: Option<Arc<dyn DocumentSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ScoutEngineBuilder {
    /// Override the index configuration (chunk sizes, TTL, threshold).
    #[must_use]
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the query analyzer's synonym and intent tables.
    #[must_use]
    pub fn query_config(mut self, query_config: QueryConfig) -> Self {
        self.query_config = query_config;
        self
    }

    /// Set the chunk store. Required.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ChunkStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the document source. Required.
    #[must_use]
    pub fn documents(mut self, documents: Arc<dyn DocumentSource>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Inject a clock; defaults to wall-clock time.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the engine.
    ///
    /// # Panics
    ///
    /// Panics if [`store()`](Self::store) or [`documents()`](Self::documents)
    /// was not called.
    pub fn build(self) -> ScoutEngine {
        let store = self.store.expect("ScoutEngineBuilder requires a chunk store");
        let documents = self
            .documents
            .expect("ScoutEngineBuilder requires a document source");
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let index = ChunkIndex::new(&self.config, store, documents, clock.clone());
        let cache = ResultCache::new(self.config.cache_ttl, clock);
        ScoutEngine {
            analyzer: QueryAnalyzer::new(self.query_config),
            index,
            cache,
            config: self.config,
        }
    }
}
