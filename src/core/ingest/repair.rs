//! Size-constrained chunk repair.
//!
//! The splitter targets a size but enforces nothing; the vector store
//! enforces a hard limit. This engine sits between the two and
//! guarantees every emitted chunk stays within a safety margin below
//! the storage limit, without truncating content.
//!
//! Repair is two-tier. Sentence-boundary repacking is tried first; if
//! any repacked piece still overflows (a single sentence can exceed
//! the limit), the whole chunk falls through to fixed-width windowing
//! with a small overlap between windows. The two strategies are never
//! mixed within one source chunk.

use crate::core::ingest::splitter::char_len;

/// Outcome of the sentence-repacking pass.
///
/// Modeled as a tagged result rather than nested conditionals so the
/// exhaustive-fallback contract stays explicit and testable.
#[derive(Debug)]
enum RepackOutcome {
    /// Every repacked piece satisfies the limit
    Fits(Vec<String>),

    /// At least one piece still overflows; window the original text
    NeedsWindowing,
}

/// Enforces the safety size limit on splitter output.
#[derive(Debug, Clone)]
pub struct OversizeRepair {
    /// Maximum characters per emitted chunk (margin below the hard
    /// storage limit)
    safety_max: usize,

    /// Characters duplicated between adjacent fixed-width windows
    window_overlap: usize,
}

/// Result of repairing one section's chunks
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Chunks that exceeded the limit and were re-chunked
    pub repaired: usize,
}

impl OversizeRepair {
    /// Create a new repair engine.
    ///
    /// # Panics
    ///
    /// Panics if `safety_max` is 0 or if `window_overlap` is not
    /// below 90% of `safety_max` (windowing would stall).
    pub fn new(safety_max: usize, window_overlap: usize) -> Self {
        assert!(safety_max > 0, "safety_max must be > 0");
        assert!(
            window_overlap < safety_max * 9 / 10,
            "window_overlap must be < 90% of safety_max"
        );

        Self {
            safety_max,
            window_overlap,
        }
    }

    /// Enforce the size limit on an ordered sequence of chunks.
    ///
    /// Compliant chunks pass through unchanged and in order; each
    /// oversized chunk is replaced in place by its repaired pieces.
    pub fn enforce(&self, chunks: Vec<String>) -> (Vec<String>, RepairReport) {
        let mut safe = Vec::with_capacity(chunks.len());
        let mut report = RepairReport::default();

        for chunk in chunks {
            if char_len(&chunk) <= self.safety_max {
                safe.push(chunk);
            } else {
                report.repaired += 1;
                safe.extend(self.repair(&chunk));
            }
        }

        if report.repaired > 0 {
            tracing::info!(
                "Re-chunked {} oversized chunks into {} total",
                report.repaired,
                safe.len()
            );
        }

        (safe, report)
    }

    /// Repair a single oversized chunk.
    fn repair(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.safety_max {
            return vec![text.to_string()];
        }

        match self.repack_sentences(text) {
            RepackOutcome::Fits(pieces) => pieces,
            RepackOutcome::NeedsWindowing => self.window(text),
        }
    }

    /// Tier 1: split on sentence terminators and greedily repack.
    ///
    /// The split consumes the terminators, so each fragment gets its
    /// `.` re-appended. The final fragment only had one when the
    /// source text itself ended with a terminator.
    fn repack_sentences(&self, text: &str) -> RepackOutcome {
        let fragments: Vec<&str> = text
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if fragments.len() <= 1 {
            return RepackOutcome::NeedsWindowing;
        }

        let last_has_terminator = text.trim_end().ends_with('.');
        let last_idx = fragments.len() - 1;
        let mut pieces = Vec::new();
        let mut current = String::new();

        for (idx, fragment) in fragments.iter().enumerate() {
            let sentence = if idx == last_idx && !last_has_terminator {
                (*fragment).to_string()
            } else {
                format!("{fragment}.")
            };

            if current.is_empty() {
                current = sentence;
            } else if char_len(&current) + 1 + char_len(&sentence) <= self.safety_max {
                current.push(' ');
                current.push_str(&sentence);
            } else {
                pieces.push(std::mem::replace(&mut current, sentence));
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        // No partial mixing: one overflowing piece sends the whole
        // chunk to windowing.
        if pieces.iter().all(|p| char_len(p) <= self.safety_max) {
            RepackOutcome::Fits(pieces)
        } else {
            RepackOutcome::NeedsWindowing
        }
    }

    /// Tier 2: fixed-width windows with overlap.
    ///
    /// Walks the text in windows of `safety_max` characters, each
    /// subsequent window starting `safety_max - window_overlap` after
    /// the previous one's start. If a whitespace break point exists in
    /// the final 10% of a window, the cut moves there to avoid
    /// splitting mid-word. The final window runs to the end of the
    /// text regardless of size.
    fn window(&self, text: &str) -> Vec<String> {
        // (byte offset, char) pairs keep every cut on a character
        // boundary.
        let char_indices: Vec<(usize, char)> = text.char_indices().collect();
        let total = char_indices.len();

        let mut pieces = Vec::new();
        let mut start = 0usize;

        loop {
            let end = start + self.safety_max;

            if end >= total {
                pieces.push(text[char_indices[start].0..].to_string());
                break;
            }

            let mut cut = end;
            let window = &char_indices[start..end];
            if let Some(pos) = window.iter().rposition(|(_, c)| c.is_whitespace()) {
                if pos > self.safety_max * 9 / 10 {
                    cut = start + pos;
                }
            }

            let byte_start = char_indices[start].0;
            let byte_end = char_indices[cut].0;
            pieces.push(text[byte_start..byte_end].to_string());

            start = cut - self.window_overlap;
        }

        pieces
    }
}
