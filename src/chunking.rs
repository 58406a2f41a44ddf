//! Splitting document text into overlapping, page-estimated chunks.

use tracing::debug;

/// A chunk produced by [`Chunker::split`], not yet persisted or vectorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDraft {
    /// 0-based position of this chunk within its document.
    pub index: usize,
    /// Estimated page, between 1 and the document's declared page count.
    pub page: u32,
    pub text: String,
}

/// Splits raw document text into an ordered sequence of overlapping chunks.
///
/// Paragraphs (blank-line delimited) are accumulated into a buffer until the
/// next paragraph would push it past `chunk_size`; the buffer is then emitted
/// and the next one is seeded with the emitted chunk's trailing
/// `chunk_overlap` characters, so consecutive chunks always share context
/// across the boundary. A single paragraph long enough to blow the buffer
/// past 1.5 x `chunk_size` is re-split on sentence boundaries instead.
///
/// Page numbers are a linear interpolation over the document's character
/// count, not an exact mapping.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into chunk drafts with indices assigned in emission
    /// order. Empty input yields no chunks; the final non-empty buffer is
    /// always emitted even when it is under `chunk_size`.
    pub fn split(&self, text: &str, page_count: u32) -> Vec<ChunkDraft> {
        let text_len = char_len(text);
        let mut chunks: Vec<ChunkDraft> = Vec::new();
        let mut current = String::new();

        let mut emit = |buffer: &str, chunks: &mut Vec<ChunkDraft>| {
            let index = chunks.len();
            chunks.push(ChunkDraft {
                index,
                page: self.estimate_page(index, text_len, page_count),
                text: buffer.trim().to_string(),
            });
        };

        for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if !current.is_empty() && char_len(&current) + char_len(paragraph) > self.chunk_size {
                // Overflow: emit the buffer and carry trailing context over.
                let emitted = current.trim().to_string();
                emit(&emitted, &mut chunks);
                current = format!("{}\n\n{}", tail_chars(&emitted, self.chunk_overlap), paragraph);
            } else if current.is_empty() {
                current = paragraph.to_string();
            } else {
                current.push_str("\n\n");
                current.push_str(paragraph);
            }

            // One very long paragraph: fall back to sentence boundaries.
            if char_len(&current) * 2 > self.chunk_size * 3 {
                current = self.split_sentences(&current, &mut chunks, &mut emit);
            }
        }

        if !current.trim().is_empty() {
            emit(&current, &mut chunks);
        }

        debug!(chunks = chunks.len(), text_len, page_count, "split document");
        chunks
    }

    /// Re-accumulate an oversized buffer sentence by sentence, emitting full
    /// chunks along the way and returning the unfinished remainder.
    fn split_sentences(
        &self,
        buffer: &str,
        chunks: &mut Vec<ChunkDraft>,
        emit: &mut impl FnMut(&str, &mut Vec<ChunkDraft>),
    ) -> String {
        let mut sentence_chunk = String::new();
        for sentence in buffer
            .split(['.', '!', '?'])
            .filter(|s| char_len(s.trim()) >= 10)
        {
            if !sentence_chunk.is_empty()
                && char_len(&sentence_chunk) + char_len(sentence) > self.chunk_size
            {
                emit(&sentence_chunk, chunks);
                sentence_chunk = sentence.to_string();
            } else {
                sentence_chunk.push_str(sentence);
            }
        }
        sentence_chunk
    }

    /// `clamp(ceil(index * chunk_size / (text_len / page_count)), 1, page_count)`.
    fn estimate_page(&self, index: usize, text_len: usize, page_count: u32) -> u32 {
        if text_len == 0 || page_count <= 1 {
            return 1;
        }
        let chars_per_page = text_len as f64 / page_count as f64;
        let page = ((index * self.chunk_size) as f64 / chars_per_page).ceil() as i64;
        page.clamp(1, i64::from(page_count)) as u32
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `n` characters of `s` (the whole string when shorter).
fn tail_chars(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n {
        return s;
    }
    let cut = s.char_indices().nth(len - n).map_or(0, |(i, _)| i);
    &s[cut..]
}
