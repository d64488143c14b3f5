//! Sentence-aware text splitting.
//!
//! Splits extracted section text into chunks around a configured
//! target size, preferring sentence boundaries and carrying a
//! configurable overlap of trailing sentences into the next chunk.
//! All sizes are measured in **characters**, not bytes, so chunk
//! boundaries never fall inside a multi-byte UTF-8 sequence.
//!
//! The splitter does not enforce any hard upper bound: a single
//! sentence longer than the target passes through whole. Enforcing
//! the storage size limit is the repair engine's job.

/// Separator inserted between sentences when assembling chunks
const SENTENCE_SEPARATOR: &str = "\n\n";

/// Sentence-aware splitter with target size and overlap.
///
/// Deterministic: identical input and configuration always produce
/// identical output.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    /// Target characters per chunk
    target_size: usize,

    /// Characters of trailing-sentence overlap between chunks
    overlap: usize,
}

impl TextSplitter {
    /// Create a new splitter.
    ///
    /// # Panics
    ///
    /// Panics if `target_size` is 0 or if `overlap >= target_size`.
    pub fn new(target_size: usize, overlap: usize) -> Self {
        assert!(target_size > 0, "target_size must be > 0");
        assert!(overlap < target_size, "overlap must be < target_size");

        Self {
            target_size,
            overlap,
        }
    }

    /// Split section text into an ordered sequence of chunks.
    ///
    /// Empty (or whitespace-only) input produces an empty sequence,
    /// not an error.
    pub fn split(&self, text: &str) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();

        for sentence in &sentences {
            let sentence = sentence.as_str();
            if !window.is_empty() && self.would_overflow(&window, sentence) {
                chunks.push(window.join(SENTENCE_SEPARATOR));

                // Retain a tail of sentences as the overlap seed for
                // the next chunk.
                while !window.is_empty()
                    && (joined_len(&window) > self.overlap
                        || self.would_overflow(&window, sentence))
                {
                    window.remove(0);
                }
            }
            window.push(sentence);
        }

        if !window.is_empty() {
            chunks.push(window.join(SENTENCE_SEPARATOR));
        }

        chunks
    }

    /// Would appending `next` to the window exceed the target size?
    fn would_overflow(&self, window: &[&str], next: &str) -> bool {
        let sep = if window.is_empty() {
            0
        } else {
            SENTENCE_SEPARATOR.len()
        };
        joined_len(window) + sep + char_len(next) > self.target_size
    }
}

/// Character length of a window once joined with separators
fn joined_len(window: &[&str]) -> usize {
    if window.is_empty() {
        return 0;
    }
    let content: usize = window.iter().map(|s| char_len(s)).sum();
    content + SENTENCE_SEPARATOR.len() * (window.len() - 1)
}

/// Character count (not byte count) of a string
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text into sentences, keeping terminators attached.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace, or at a
/// blank line (paragraph break). The trailing whitespace itself is
/// consumed; chunks are re-joined with [`SENTENCE_SEPARATOR`].
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    let mut flush = |buf: &mut String| {
        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
        buf.clear();
    };

    for c in text.chars() {
        if c == '\n' && prev == Some('\n') {
            // Paragraph break
            flush(&mut current);
            prev = None;
            continue;
        }

        if c.is_whitespace() && matches!(prev, Some('.') | Some('!') | Some('?')) {
            flush(&mut current);
            prev = if c == '\n' { Some('\n') } else { None };
            continue;
        }

        current.push(c);
        prev = Some(c);
    }
    flush(&mut current);

    sentences
}
