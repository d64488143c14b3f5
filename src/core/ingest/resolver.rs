//! Section resolution from inferred page boundaries.
//!
//! The page-locating call reads like a table of contents: printed page
//! numbers, as strings, per named section. Printed numbers do not line
//! up with physical page indices, so resolution widens every range by
//! a configured offset on both ends before extraction. Sections whose
//! inference failed (both boundaries empty) are skipped, not fatal.

use crate::core::types::{PageRange, ResolvedSection, SectionMap};

/// Resolves inferred section boundaries into extraction-ready ranges.
#[derive(Debug, Clone)]
pub struct SectionResolver {
    /// Pages subtracted from start / added to end
    page_offset: usize,
}

impl SectionResolver {
    /// Create a resolver with the given page-offset correction.
    pub fn new(page_offset: usize) -> Self {
        Self { page_offset }
    }

    /// Resolve an inferred section map into an ordered sequence of
    /// sections ready for extraction, ordered by corrected start page.
    ///
    /// Sections with unusable boundaries are logged and omitted; a
    /// missing or unparseable `end` makes the section open-ended
    /// (extract to the document's last page).
    pub fn resolve(&self, map: &SectionMap) -> Vec<ResolvedSection> {
        let mut resolved = Vec::new();

        for (name, bounds) in map {
            if bounds.start.trim().is_empty() && bounds.end.trim().is_empty() {
                // Inference failed to place this section
                tracing::warn!("Skipping section '{}': no inferred page range", name);
                continue;
            }

            let start = match bounds.start.trim().parse::<i64>() {
                Ok(page) => page,
                Err(_) => {
                    tracing::warn!(
                        "Skipping section '{}': unusable start page {:?}",
                        name,
                        bounds.start
                    );
                    continue;
                }
            };

            // Widen the range to compensate for printed-vs-physical
            // misalignment. Physical indices are 0-based, so 0 is a
            // valid start; only a negative result is clamped.
            let corrected = start - self.page_offset as i64;
            let corrected_start = if corrected < 0 { 1 } else { corrected as usize };

            let end = bounds
                .end
                .trim()
                .parse::<usize>()
                .ok()
                .map(|page| page + self.page_offset);

            if end.is_none() {
                tracing::debug!("Section '{}' is open-ended (extract to last page)", name);
            }

            resolved.push(ResolvedSection {
                name: name.clone(),
                pages: PageRange {
                    start: corrected_start,
                    end,
                },
            });
        }

        resolved.sort_by_key(|section| section.pages.start);
        resolved
    }
}
