//! Query expansion and intent classification.
//!
//! Expansion widens recall by unioning a query's tokens with related terms
//! from a fixed one-directional synonym table; intent classification reads a
//! coarse information need off keyword patterns so scoring and answer
//! assembly can bias toward the right kind of chunk.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::tokenize;

/// Coarse classification of what a query is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Definition,
    Types,
    Examples,
    How,
    When,
    Where,
    Why,
    Comparison,
    General,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Definition => "definition",
            QueryIntent::Types => "types",
            QueryIntent::Examples => "examples",
            QueryIntent::How => "how",
            QueryIntent::When => "when",
            QueryIntent::Where => "where",
            QueryIntent::Why => "why",
            QueryIntent::Comparison => "comparison",
            QueryIntent::General => "general",
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Related-term expansions, one-directional: looking up a token yields its
/// related terms, never the reverse.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("ai", &["artificial", "intelligence", "machine", "smart", "automated"]),
    ("machine", &["learning", "algorithm", "model", "system", "automation"]),
    ("neural", &["network", "deep", "learning", "brain", "cognitive"]),
    ("deep", &["learning", "neural", "network", "advanced", "sophisticated"]),
    ("nlp", &["natural", "language", "processing", "text", "linguistic"]),
    ("computer", &["vision", "image", "recognition", "visual", "optical"]),
    ("algorithm", &["method", "technique", "approach", "procedure", "process"]),
    ("data", &["dataset", "information", "training", "sample", "example"]),
    ("model", &["algorithm", "system", "network", "framework", "architecture"]),
    ("training", &["learning", "optimization", "fitting", "education", "development"]),
    ("intelligence", &["smart", "cognitive", "mental", "brain", "mind"]),
    ("learning", &["education", "training", "development", "improvement", "adaptation"]),
    ("vision", &["sight", "visual", "image", "optical", "perception"]),
    ("language", &["speech", "text", "communication", "linguistic", "verbal"]),
    ("processing", &["analysis", "computation", "handling", "manipulation", "treatment"]),
];

/// Intent keyword patterns, in priority order. The first intent with a
/// substring match against the lowercased query wins.
const INTENT_PATTERNS: &[(QueryIntent, &[&str])] = &[
    (QueryIntent::Definition, &["what is", "define", "definition", "meaning", "explain"]),
    (QueryIntent::Types, &["types", "kinds", "categories", "varieties", "different"]),
    (QueryIntent::Examples, &["examples", "instance", "case", "sample", "illustration"]),
    (QueryIntent::How, &["how", "process", "method", "way", "procedure"]),
    (QueryIntent::When, &["when", "history", "timeline", "evolution", "development"]),
    (QueryIntent::Where, &["where", "applications", "uses", "implementations", "deployments"]),
    (QueryIntent::Why, &["why", "benefits", "advantages", "importance", "significance"]),
    (QueryIntent::Comparison, &["vs", "versus", "compare", "difference", "contrast"]),
];

/// Immutable lookup tables backing a [`QueryAnalyzer`].
///
/// The default tables are the engine's built-in vocabulary; tests substitute
/// their own to pin expansion behavior down without depending on it.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    synonyms: FxHashMap<String, Vec<String>>,
    intent_patterns: Vec<(QueryIntent, Vec<String>)>,
}

impl QueryConfig {
    pub fn new(
        synonyms: FxHashMap<String, Vec<String>>,
        intent_patterns: Vec<(QueryIntent, Vec<String>)>,
    ) -> Self {
        Self {
            synonyms,
            intent_patterns,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        let synonyms = SYNONYMS
            .iter()
            .map(|(token, related)| {
                (
                    (*token).to_string(),
                    related.iter().map(|r| (*r).to_string()).collect(),
                )
            })
            .collect();
        let intent_patterns = INTENT_PATTERNS
            .iter()
            .map(|(intent, patterns)| {
                (
                    *intent,
                    patterns.iter().map(|p| (*p).to_string()).collect(),
                )
            })
            .collect();
        Self::new(synonyms, intent_patterns)
    }
}

/// Expands queries and classifies their intent against fixed tables.
#[derive(Debug, Clone, Default)]
pub struct QueryAnalyzer {
    config: QueryConfig,
}

impl QueryAnalyzer {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Expand a query into the deduplicated union of its own tokens and all
    /// synonym-table expansions, original tokens first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use knowledgescout::query::QueryAnalyzer;
    ///
    /// let analyzer = QueryAnalyzer::default();
    /// let terms = analyzer.expand("machine learning");
    /// assert!(terms.starts_with(&["machine".to_string(), "learning".to_string()]));
    /// assert!(terms.contains(&"algorithm".to_string()));
    /// ```
    pub fn expand(&self, query: &str) -> Vec<String> {
        let tokens = tokenize(query);
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut terms: Vec<String> = Vec::new();

        for token in &tokens {
            if seen.insert(token.clone()) {
                terms.push(token.clone());
            }
        }
        for token in &tokens {
            if let Some(related) = self.config.synonyms.get(token) {
                for term in related {
                    if seen.insert(term.clone()) {
                        terms.push(term.clone());
                    }
                }
            }
        }

        debug!(original = tokens.len(), expanded = terms.len(), "expanded query");
        terms
    }

    /// Classify the query's intent from the first matching keyword pattern;
    /// earlier patterns take priority, no match means [`QueryIntent::General`].
    pub fn classify_intent(&self, query: &str) -> QueryIntent {
        let lowered = query.to_lowercase();
        for (intent, patterns) in &self.config.intent_patterns {
            if patterns.iter().any(|pattern| lowered.contains(pattern)) {
                return *intent;
            }
        }
        QueryIntent::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_is_a_superset_of_query_tokens() {
        let analyzer = QueryAnalyzer::default();
        let terms = analyzer.expand("How does machine learning use training data?");
        for token in tokenize("How does machine learning use training data?") {
            assert!(terms.contains(&token), "missing original token {token}");
        }
    }

    #[test]
    fn expansion_deduplicates() {
        let analyzer = QueryAnalyzer::default();
        let terms = analyzer.expand("learning learning machine");
        let mut deduped = terms.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(terms.len(), deduped.len());
        // "machine" expands to "learning" among others; the query already
        // contains it, so it appears once.
        assert_eq!(terms.iter().filter(|t| *t == "learning").count(), 1);
    }

    #[test]
    fn expanding_expanded_terms_adds_nothing_new() {
        let analyzer = QueryAnalyzer::default();
        let first = analyzer.expand("neural networks");
        let again = analyzer.expand(&first.join(" "));
        for term in &first {
            assert!(again.contains(term));
        }
    }

    #[test]
    fn classifies_definition_queries() {
        let analyzer = QueryAnalyzer::default();
        assert_eq!(
            analyzer.classify_intent("What is machine learning?"),
            QueryIntent::Definition
        );
        assert_eq!(analyzer.classify_intent("Define entropy"), QueryIntent::Definition);
    }

    #[test]
    fn types_wins_when_no_definition_pattern_is_present() {
        let analyzer = QueryAnalyzer::default();
        // "What are the types..." has no "what is" substring, so the types
        // pattern is the first to match.
        assert_eq!(
            analyzer.classify_intent("What are the types of neural networks?"),
            QueryIntent::Types
        );
    }

    #[test]
    fn earlier_patterns_take_priority() {
        let analyzer = QueryAnalyzer::default();
        // Matches both "what is" (definition) and "types"; definition is
        // listed first.
        assert_eq!(
            analyzer.classify_intent("What is types theory?"),
            QueryIntent::Definition
        );
    }

    #[test]
    fn unmatched_queries_are_general() {
        let analyzer = QueryAnalyzer::default();
        assert_eq!(analyzer.classify_intent("chunk overlap"), QueryIntent::General);
    }

    #[test]
    fn where_intent_covers_applications() {
        let analyzer = QueryAnalyzer::default();
        assert_eq!(
            analyzer.classify_intent("applications of computer vision"),
            QueryIntent::Where
        );
    }

    #[test]
    fn intent_serializes_lowercase() {
        let json = serde_json::to_string(&QueryIntent::Definition).unwrap();
        assert_eq!(json, "\"definition\"");
    }
}
