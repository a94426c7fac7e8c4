//! Citation linking between the model answer and retrieved chunks
//!
//! The model is instructed to cite sections and pages. This module parses
//! those references back out of the answer and links them to the chunks that
//! grounded it, so the presentation layer can render the sources actually
//! used. When the answer cites nothing recognizable, every retrieved source
//! is returned in rank order, matching how the original assistant displayed
//! its source boxes.

use regex::Regex;
use std::sync::OnceLock;

use hswa_index::SearchHit;

use crate::types::Citation;

fn page_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bpage\s+(\d{1,4})\b").expect("valid regex"))
}

fn section_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bsection\s+(\d{1,4}[A-Z]{0,2})\b").expect("valid regex"))
}

/// Link the answer's page and section references to the retrieval result.
///
/// A hit is considered cited when the answer mentions a page inside the hit's
/// page range, or quotes a section number that appears in the hit's text.
/// Returns citations in retrieval (rank) order.
pub fn link_citations(answer: &str, hits: &[SearchHit]) -> Vec<Citation> {
    let cited_pages: Vec<u32> = page_ref_pattern()
        .captures_iter(answer)
        .filter_map(|cap| cap[1].parse().ok())
        .collect();

    let cited_sections: Vec<String> = section_ref_pattern()
        .captures_iter(answer)
        .map(|cap| cap[1].to_string())
        .collect();

    let mut citations: Vec<Citation> = hits
        .iter()
        .filter(|hit| {
            let page_match = cited_pages
                .iter()
                .any(|p| *p >= hit.chunk.page_start && *p <= hit.chunk.page_end);
            let section_match = cited_sections
                .iter()
                .any(|s| mentions_section(&hit.chunk.text, s));
            page_match || section_match
        })
        .map(Citation::from_hit)
        .collect();

    // Nothing recognizably cited: fall back to all retrieved sources.
    if citations.is_empty() {
        citations = hits.iter().map(Citation::from_hit).collect();
    }

    citations
}

/// Whether the chunk text mentions the given section number.
fn mentions_section(text: &str, section: &str) -> bool {
    section_ref_pattern()
        .captures_iter(text)
        .any(|cap| cap[1].eq_ignore_ascii_case(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hswa_index::ChunkRecord;

    fn hit(id: u32, text: &str, page_start: u32, page_end: u32, score: f32) -> SearchHit {
        SearchHit {
            chunk: ChunkRecord {
                id,
                text: text.to_string(),
                page_start,
                page_end,
                char_start: 0,
                char_end: text.len(),
            },
            score,
        }
    }

    #[test]
    fn page_reference_links_to_matching_chunk() {
        let hits = vec![
            hit(0, "the primary duty of care", 24, 24, 0.9),
            hit(1, "offences and penalties", 90, 91, 0.5),
        ];
        let citations = link_citations(
            "According to Section 36 on page 24, a PCBU must ensure safety.",
            &hits,
        );
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].chunk_id, 0);
    }

    #[test]
    fn section_reference_links_via_chunk_text() {
        let hits = vec![
            hit(0, "Section 36: a PCBU must ensure, so far as is reasonably practicable...", 24, 24, 0.9),
            hit(1, "unrelated definitions", 5, 5, 0.4),
        ];
        let citations = link_citations("The Act answers this in Section 36.", &hits);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].chunk_id, 0);
    }

    #[test]
    fn page_inside_a_spanning_range_matches() {
        let hits = vec![hit(0, "spanning text", 24, 26, 0.9)];
        let citations = link_citations("See page 25 of the Act.", &hits);
        assert_eq!(citations.len(), 1);
    }

    #[test]
    fn uncited_answer_falls_back_to_all_sources_in_rank_order() {
        let hits = vec![
            hit(0, "first", 1, 1, 0.9),
            hit(1, "second", 2, 2, 0.7),
        ];
        let citations = link_citations("I don't have enough information in the Act.", &hits);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].chunk_id, 0);
        assert_eq!(citations[1].chunk_id, 1);
    }

    #[test]
    fn empty_retrieval_produces_no_citations() {
        assert!(link_citations("anything", &[]).is_empty());
    }
}
