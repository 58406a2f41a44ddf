//! Intent-aware relevance scoring of chunks against expanded query terms.
//!
//! The formula is an empirically tuned cascade of multiplicative tiers. Its
//! raw output values are part of the observable contract (the retrieval
//! threshold and answer-composition fractions are calibrated against them),
//! so the weights here must not be "improved" in isolation.

use crate::query::QueryIntent;
use crate::text::tokenize;

/// Weight of an exact token match.
const EXACT_WEIGHT: f64 = 4.0;
/// Weight of a partial (substring containment) match.
const PARTIAL_WEIGHT: f64 = 2.0;

/// Marker phrases and multiplier for each boosted intent. A chunk containing
/// one of the markers for the query's intent gets exactly one multiplier.
const DEFINITION_MARKERS: &[&str] = &["is a", "refers to", "means", "defined as"];
const TYPES_MARKERS: &[&str] = &["types", "categories", "kinds", "varieties"];
const EXAMPLES_MARKERS: &[&str] = &["examples", "instance", "such as", "including"];
const HOW_MARKERS: &[&str] = &["how", "process", "method", "way"];
const APPLICATION_MARKERS: &[&str] = &["applications", "uses", "implementations", "deployments"];

/// Score a chunk's relevance to a set of expanded query terms.
///
/// Term matching counts exact token hits at four points and one-directional
/// substring containment (either way) at two; the sum is then boosted by the
/// intent marker tier, by query-term coverage, and damped by a length
/// penalty that favors moderately concise chunks. The result is non-negative
/// and unbounded above; it is not normalized across queries.
pub fn score(query_terms: &[String], chunk_text: &str, intent: QueryIntent) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }

    let chunk_tokens = tokenize(chunk_text);
    let mut score = 0.0;
    let mut covered = 0usize;

    for term in query_terms {
        let mut partial = 0usize;
        let mut exact = 0usize;
        for token in &chunk_tokens {
            if token == term {
                exact += 1;
                partial += 1;
            } else if token.contains(term.as_str()) || term.contains(token.as_str()) {
                partial += 1;
            }
        }
        if partial > 0 {
            covered += 1;
            score += exact as f64 * EXACT_WEIGHT + (partial - exact) as f64 * PARTIAL_WEIGHT;
        }
    }

    score *= intent_multiplier(chunk_text, intent);

    let coverage = covered as f64 / query_terms.len() as f64;
    score *= 1.0 + coverage * 2.0;

    score * length_penalty(chunk_text)
}

/// One multiplier tier per boosted intent; neutral when the query's intent
/// has no tier or the chunk carries none of its markers.
fn intent_multiplier(chunk_text: &str, intent: QueryIntent) -> f64 {
    let lowered = chunk_text.to_lowercase();
    match intent {
        QueryIntent::Definition if contains_any(&lowered, DEFINITION_MARKERS) => 2.0,
        QueryIntent::Types if contains_any(&lowered, TYPES_MARKERS) => 1.8,
        QueryIntent::Examples if contains_any(&lowered, EXAMPLES_MARKERS) => 1.6,
        QueryIntent::How if contains_any(&lowered, HOW_MARKERS) => 1.5,
        // Queries about "where" something is used reward chunks that talk
        // about applications and deployments.
        QueryIntent::Where if contains_any(&lowered, APPLICATION_MARKERS) => 1.7,
        _ => 1.0,
    }
}

/// `max(0.2, 1 - (len - 100) / 1000)`: chunks near 100 characters are
/// neutral, very long chunks bottom out at 0.2, shorter ones get a mild
/// boost.
fn length_penalty(chunk_text: &str) -> f64 {
    let len = chunk_text.chars().count() as f64;
    (1.0 - (len - 100.0) / 1000.0).max(0.2)
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}
