//! Tokenization and term-frequency vectors.
//!
//! Every component that looks at words (vectorizer, query analyzer, scorer)
//! goes through [`tokenize`] so chunks and queries share one vocabulary.

use rustc_hash::FxHashMap;

/// Split text into lowercase word tokens.
///
/// Punctuation is removed (not replaced with whitespace), the remainder is
/// split on whitespace, and tokens of two characters or fewer are dropped.
///
/// # Examples
///
/// ```rust
/// use knowledgescout::text::tokenize;
///
/// assert_eq!(
///     tokenize("Machine learning, explained!"),
///     vec!["machine", "learning", "explained"]
/// );
/// assert!(tokenize("a an it").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Compute the term-frequency vector of a text.
///
/// Each surviving distinct token maps to its occurrence count divided by the
/// total surviving token count, so the weights of any non-empty text sum
/// to 1.0. Deterministic and side-effect free; an empty or all-stopword text
/// yields an empty map.
pub fn vectorize(text: &str) -> FxHashMap<String, f64> {
    let tokens = tokenize(text);
    let total = tokens.len() as f64;

    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for token in tokens {
        *counts.entry(token).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(word, count)| (word, count as f64 / total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_punctuation_and_short_words() {
        let tokens = tokenize("AI is a sub-field of computer science!");
        // "ai", "is", "a", and "of" fall under the length cutoff; "sub-field"
        // collapses to one token once the hyphen is removed.
        assert_eq!(tokens, vec!["subfield", "computer", "science"]);
    }

    #[test]
    fn vectorize_empty_text_is_empty() {
        assert!(vectorize("").is_empty());
        assert!(vectorize("a an of . !").is_empty());
    }

    #[test]
    fn vectorize_weights_sum_to_one() {
        let vector = vectorize("networks learn, networks generalize");
        let sum: f64 = vector.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // "networks" appears twice out of four surviving tokens.
        assert!((vector["networks"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn vectorize_is_deterministic() {
        let text = "deep learning models require training data";
        assert_eq!(vectorize(text), vectorize(text));
    }
}
