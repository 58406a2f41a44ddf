//! Lightweight document retrieval engine.
//!
//! Documents come in as already-extracted text with a declared page count;
//! answers go out as composed text with ranked source citations. Everything
//! in between is deliberately simple: bag-of-words term frequencies, a fixed
//! synonym table, and a tuned multiplicative scoring cascade. No learned
//! embeddings anywhere.
//!
//! ```text
//! Document text ──► chunking::Chunker ──► text::vectorize ──► stores::ChunkStore
//!
//! Query ──► cache::ResultCache (hit? return)
//!        └─► query::QueryAnalyzer ──► expand + classify intent
//!                    │
//!                    ▼
//!            index::ChunkIndex::top_k ──► scoring::score per chunk
//!                    │
//!                    ▼
//!            answer::compose ──► cache::ResultCache ──► AskResponse
//! ```
//!
//! [`engine::ScoutEngine`] wires the pipeline together over injected
//! [`stores::ChunkStore`] / [`stores::DocumentSource`] implementations; see
//! its docs for a quickstart.

pub mod answer;
pub mod cache;
pub mod chunking;
pub mod clock;
pub mod config;
pub mod engine;
pub mod index;
pub mod query;
pub mod scoring;
pub mod stores;
pub mod text;
pub mod types;

pub use answer::NO_RESULTS_ANSWER;
pub use cache::ResultCache;
pub use chunking::{ChunkDraft, Chunker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::IndexConfig;
pub use engine::{ScoutEngine, ScoutEngineBuilder};
pub use index::{ChunkIndex, IndexStats, RebuildReport, ScoredChunk};
pub use query::{QueryAnalyzer, QueryConfig, QueryIntent};
pub use stores::{
    ChunkRecord, ChunkStore, DocumentRecord, DocumentSource, MemoryChunkStore,
    MemoryDocumentSource, SqliteChunkStore,
};
pub use types::{AskResponse, ScoutError, SourceRef};
