//! Assembling a final answer from ranked chunks.

use crate::index::ScoredChunk;
use crate::query::QueryIntent;

/// Returned when no chunk clears the relevance threshold.
pub const NO_RESULTS_ANSWER: &str = "No relevant information found in the documents.";

/// Marker appended to every truncated excerpt.
const ELLIPSIS: &str = "...";

/// Hard cap on the assembled answer, in characters.
const MAX_ANSWER_LEN: usize = 800;

/// Compose an answer from ranked chunks.
///
/// The top chunk's text is the base. Depending on intent, excerpts from
/// later chunks are appended when their score is close enough to the top
/// score: definitions get one supporting excerpt, type and example queries
/// get up to two shorter ones, everything else gets one. Answers over 800
/// characters are cut off with an ellipsis marker.
pub fn compose(ranked: &[ScoredChunk], intent: QueryIntent) -> String {
    let Some(best) = ranked.first() else {
        return NO_RESULTS_ANSWER.to_string();
    };

    // (max follow-up excerpts, fraction of the top score required, excerpt length)
    let (max_excerpts, fraction, excerpt_len) = match intent {
        QueryIntent::Definition => (1, 0.7, 200),
        QueryIntent::Types => (2, 0.6, 150),
        QueryIntent::Examples => (2, 0.5, 100),
        _ => (1, 0.6, 200),
    };

    let mut answer = best.record.text.clone();
    let mut appended = 0usize;
    for chunk in ranked.iter().skip(1) {
        if appended == max_excerpts {
            break;
        }
        if chunk.record.text == best.record.text {
            continue;
        }
        if chunk.score > best.score * fraction {
            answer.push(' ');
            answer.push_str(truncate_chars(&chunk.record.text, excerpt_len));
            answer.push_str(ELLIPSIS);
            appended += 1;
        }
    }

    if answer.chars().count() > MAX_ANSWER_LEN {
        answer = format!("{}{}", truncate_chars(&answer, MAX_ANSWER_LEN), ELLIPSIS);
    }
    answer
}

/// The first `n` characters of `s`, cut on a character boundary.
pub(crate) fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::ChunkRecord;

    fn chunk(text: &str, score: f64) -> ScoredChunk {
        ScoredChunk {
            record: ChunkRecord::new("doc", 0, 1, text),
            score,
        }
    }

    #[test]
    fn empty_ranking_yields_the_sentinel() {
        assert_eq!(compose(&[], QueryIntent::Definition), NO_RESULTS_ANSWER);
    }

    #[test]
    fn single_chunk_answer_is_its_text() {
        let ranked = vec![chunk("Rust is a systems language.", 10.0)];
        assert_eq!(
            compose(&ranked, QueryIntent::Definition),
            "Rust is a systems language."
        );
    }

    #[test]
    fn definition_appends_one_close_scoring_chunk() {
        let ranked = vec![
            chunk("A compiler is a translator.", 10.0),
            chunk("It turns source code into machine code.", 8.0),
            chunk("Compilers also optimize.", 7.9),
        ];
        let answer = compose(&ranked, QueryIntent::Definition);
        assert!(answer.starts_with("A compiler is a translator."));
        assert!(answer.contains("It turns source code into machine code...."));
        assert!(!answer.contains("Compilers also optimize."));
    }

    #[test]
    fn low_scoring_chunks_are_not_appended() {
        let ranked = vec![
            chunk("A compiler is a translator.", 10.0),
            chunk("Unrelated trivia.", 3.0),
        ];
        assert_eq!(
            compose(&ranked, QueryIntent::Definition),
            "A compiler is a translator."
        );
    }

    #[test]
    fn types_appends_up_to_two_excerpts() {
        let ranked = vec![
            chunk("There are several kinds of networks.", 10.0),
            chunk("Convolutional networks handle images.", 9.0),
            chunk("Recurrent networks handle sequences.", 8.0),
            chunk("Transformers handle everything else.", 7.5),
        ];
        let answer = compose(&ranked, QueryIntent::Types);
        assert!(answer.contains("Convolutional"));
        assert!(answer.contains("Recurrent"));
        assert!(!answer.contains("Transformers"));
    }

    #[test]
    fn duplicate_top_text_is_skipped() {
        let ranked = vec![
            chunk("Same text.", 10.0),
            chunk("Same text.", 9.5),
            chunk("Different follow-up text here.", 9.0),
        ];
        let answer = compose(&ranked, QueryIntent::General);
        assert_eq!(answer, "Same text. Different follow-up text here....");
    }

    #[test]
    fn long_answers_are_capped() {
        let ranked = vec![chunk(&"verbose ".repeat(200), 10.0)];
        let answer = compose(&ranked, QueryIntent::General);
        assert_eq!(answer.chars().count(), MAX_ANSWER_LEN + ELLIPSIS.len());
        assert!(answer.ends_with(ELLIPSIS));
    }

    #[test]
    fn excerpts_are_truncated_to_intent_length() {
        let filler = "x".repeat(300);
        let ranked = vec![
            chunk("Examples follow.", 10.0),
            chunk(&filler, 9.0),
        ];
        let answer = compose(&ranked, QueryIntent::Examples);
        // "Examples follow." + space + 100 chars + "..."
        assert_eq!(answer.chars().count(), 16 + 1 + 100 + 3);
    }
}
