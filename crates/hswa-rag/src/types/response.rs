//! Query response types with citation previews

use hswa_index::SearchHit;
use serde::{Deserialize, Serialize};

/// Maximum preview length shown in a citation
const PREVIEW_LEN: usize = 150;

/// Citation pointing at a retrieved source chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Stable chunk identifier
    pub chunk_id: u32,
    /// First and last 1-based page the chunk intersects
    pub page_start: u32,
    pub page_end: u32,
    /// Text preview, truncated at a word boundary
    pub preview: String,
    /// Similarity score under the index metric
    pub score: f32,
}

impl Citation {
    /// Create a citation from a search hit
    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            chunk_id: hit.chunk.id,
            page_start: hit.chunk.page_start,
            page_end: hit.chunk.page_end,
            preview: truncate_preview(&hit.chunk.text, PREVIEW_LEN),
            score: hit.score,
        }
    }

    /// Human-readable page reference
    pub fn page_label(&self) -> String {
        if self.page_start == self.page_end {
            format!("Page {}", self.page_start)
        } else {
            format!("Pages {}-{}", self.page_start, self.page_end)
        }
    }
}

/// Raw generation output paired with the retrieval result it was grounded on
#[derive(Debug, Clone)]
pub struct Answer {
    /// The model's answer text, unmodified
    pub text: String,
    /// The ordered retrieval result the answer was conditioned on
    pub sources: Vec<SearchHit>,
}

/// Full response to a query, ready for citation rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text
    pub answer: String,
    /// Citations linked to the answer, best-first
    pub citations: Vec<Citation>,
    /// Number of chunks retrieved for grounding
    pub chunks_retrieved: usize,
    /// End-to-end processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Truncate text to `max_len` characters, preferring a word boundary.
pub fn truncate_preview(text: &str, max_len: usize) -> String {
    let flattened: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_len {
        return flattened;
    }

    let cut: String = flattened.chars().take(max_len).collect();
    match cut.rfind(' ') {
        Some(pos) if pos > 0 => format!("{}...", &cut[..pos]),
        _ => format!("{cut}..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hswa_index::ChunkRecord;

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_preview("short text", 150), "short text");
    }

    #[test]
    fn truncate_ends_at_word_boundary() {
        let text = "Workers must be consulted on health and safety matters at every workplace";
        let preview = truncate_preview(text, 30);
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 33);
        assert!(!preview.trim_end_matches("...").ends_with(' '));
    }

    #[test]
    fn truncate_collapses_newlines() {
        let preview = truncate_preview("line one\nline two", 150);
        assert_eq!(preview, "line one line two");
    }

    #[test]
    fn citation_carries_page_provenance() {
        let hit = SearchHit {
            chunk: ChunkRecord {
                id: 7,
                text: "duty of care".to_string(),
                page_start: 12,
                page_end: 13,
                char_start: 100,
                char_end: 112,
            },
            score: 0.82,
        };
        let citation = Citation::from_hit(&hit);
        assert_eq!(citation.chunk_id, 7);
        assert_eq!(citation.page_label(), "Pages 12-13");
        assert_eq!(citation.score, 0.82);
    }
}
