//! Engine configuration.

use std::time::Duration;

/// Tuning knobs for chunking, retrieval, and caching.
///
/// The defaults mirror the values the engine was tuned with; tests typically
/// shrink `chunk_size` to force multi-chunk documents out of small fixtures.
///
/// # Examples
///
/// ```rust
/// use knowledgescout::config::IndexConfig;
///
/// let config = IndexConfig::default()
///     .with_chunk_size(120)
///     .with_chunk_overlap(30);
/// assert_eq!(config.chunk_size, 120);
/// assert_eq!(config.max_sources, 3);
/// ```
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk.
    pub chunk_overlap: usize,
    /// How long a cached answer stays servable.
    pub cache_ttl: Duration,
    /// Chunks scoring at or below this are dropped from retrieval results.
    pub relevance_threshold: f64,
    /// Maximum number of cited sources on a response.
    pub max_sources: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: 400,
            chunk_overlap: 100,
            cache_ttl: Duration::from_secs(60),
            relevance_threshold: 0.5,
            max_sources: 3,
        }
    }
}

impl IndexConfig {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_relevance_threshold(mut self, threshold: f64) -> Self {
        self.relevance_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources;
        self
    }
}
