//! TTL-bounded cache of answered queries.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::clock::Clock;
use crate::types::AskResponse;

struct CacheEntry {
    payload: AskResponse,
    created_at: DateTime<Utc>,
}

/// Maps normalized queries to previously computed answers.
///
/// Keys are blake3 digests of the lowercased, trimmed query, so queries that
/// differ only in case or surrounding whitespace share an entry. An entry
/// older than the TTL is treated as absent: it is never served, and a fresh
/// `put` starts a new TTL window rather than extending the old one.
///
/// Reads and writes are safe under concurrent requests; two concurrent
/// misses for the same key may both compute, and whichever stores first
/// establishes the window subsequent reads see.
pub struct ResultCache {
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<FxHashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            // TTLs beyond chrono's range saturate.
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX),
            clock,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    fn key(query: &str) -> String {
        blake3::hash(query.trim().to_lowercase().as_bytes())
            .to_hex()
            .to_string()
    }

    /// Look up a live entry for `query`, annotated `cached = true`.
    ///
    /// Expired entries are dropped on sight and reported as misses.
    pub fn get(&self, query: &str) -> Option<AskResponse> {
        let key = Self::key(query);
        let now = self.clock.now();

        let mut entries = self.entries.write();
        match entries.get(&key) {
            Some(entry) if now - entry.created_at < self.ttl => {
                debug!(%key, "cache hit");
                let mut payload = entry.payload.clone();
                payload.cached = true;
                Some(payload)
            }
            Some(_) => {
                debug!(%key, "cache entry expired");
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store `payload` for `query`, replacing any previous entry and its
    /// timestamp. The stored copy is annotated `cached = false`.
    pub fn put(&self, query: &str, mut payload: AskResponse) {
        payload.cached = false;
        let entry = CacheEntry {
            payload,
            created_at: self.clock.now(),
        };
        self.entries.write().insert(Self::key(query), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::query::QueryIntent;

    fn response(query: &str, answer: &str) -> AskResponse {
        AskResponse {
            query: query.to_string(),
            answer: answer.to_string(),
            sources: Vec::new(),
            cached: false,
            query_intent: QueryIntent::General,
        }
    }

    fn cache_with_clock() -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = ResultCache::new(Duration::from_secs(60), clock.clone());
        (cache, clock)
    }

    #[test]
    fn unset_key_misses() {
        let (cache, _clock) = cache_with_clock();
        assert!(cache.get("anything").is_none());
    }

    #[test]
    fn put_then_get_within_ttl_hits() {
        let (cache, clock) = cache_with_clock();
        cache.put("what is rust", response("what is rust", "a language"));
        clock.advance(Duration::from_secs(59));

        let hit = cache.get("what is rust").expect("entry should be live");
        assert!(hit.cached);
        assert_eq!(hit.answer, "a language");
    }

    #[test]
    fn expired_entries_are_absent() {
        let (cache, clock) = cache_with_clock();
        cache.put("what is rust", response("what is rust", "a language"));
        clock.advance(Duration::from_secs(61));
        assert!(cache.get("what is rust").is_none());
        // No resurrection on a second read either.
        assert!(cache.get("what is rust").is_none());
    }

    #[test]
    fn keys_normalize_case_and_whitespace() {
        let (cache, _clock) = cache_with_clock();
        cache.put("What is Rust?", response("What is Rust?", "a language"));
        assert!(cache.get("  what is rust?  ").is_some());
    }

    #[test]
    fn put_replaces_entry_and_restarts_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put("q", response("q", "first"));
        clock.advance(Duration::from_secs(45));
        cache.put("q", response("q", "second"));
        clock.advance(Duration::from_secs(45));

        // 90s after the first put, but only 45s after the second.
        let hit = cache.get("q").expect("replacement restarted the window");
        assert_eq!(hit.answer, "second");
    }
}
