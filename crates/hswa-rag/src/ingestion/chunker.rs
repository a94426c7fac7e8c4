//! Fixed-window text chunking with page provenance
//!
//! Chunks are character-offset windows over the document's concatenated page
//! text: consecutive start offsets advance by `chunk_size - overlap`, every
//! chunk is at most `chunk_size` characters, and the final chunk may be
//! shorter. Each chunk records the 1-based page range it intersects, so a
//! window spanning a page break cites both pages. An optional word-boundary
//! mode pulls cut points back so no chunk splits mid-word; exact overlap is
//! only guaranteed in plain offset mode.

use unicode_segmentation::UnicodeSegmentation;

use hswa_index::ChunkRecord;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Document;

/// Splits documents into overlapping fixed-size chunks
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
    word_boundaries: bool,
}

impl Chunker {
    /// Create a chunker, rejecting `overlap >= chunk_size` before any work.
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
            word_boundaries: config.word_boundaries,
        })
    }

    /// Lazily iterate over the document's chunks.
    ///
    /// Restartable: calling this again yields an identical sequence.
    pub fn chunks(&self, doc: &Document) -> ChunkIter {
        // Pages are joined with a single newline; each page's span is extended
        // over its trailing separator so the spans tile the text with no gaps.
        let mut chars = Vec::new();
        let mut page_spans = Vec::with_capacity(doc.pages.len());

        for (i, page) in doc.pages.iter().enumerate() {
            let start = chars.len();
            chars.extend(page.text.chars());
            if i + 1 < doc.pages.len() {
                chars.push('\n');
            }
            page_spans.push(PageSpan {
                number: page.number,
                start,
                end: chars.len(),
            });
        }

        ChunkIter {
            chars,
            page_spans,
            chunk_size: self.chunk_size,
            stride: self.chunk_size - self.overlap,
            overlap: self.overlap,
            word_boundaries: self.word_boundaries,
            next_start: 0,
            next_id: 0,
            done: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PageSpan {
    number: u32,
    start: usize,
    end: usize,
}

/// Lazy, finite iterator over a document's chunks
pub struct ChunkIter {
    chars: Vec<char>,
    page_spans: Vec<PageSpan>,
    chunk_size: usize,
    stride: usize,
    overlap: usize,
    word_boundaries: bool,
    next_start: usize,
    next_id: u32,
    done: bool,
}

impl ChunkIter {
    /// True when a cut between `pos - 1` and `pos` does not split a word.
    fn is_boundary(&self, pos: usize) -> bool {
        if pos == 0 || pos >= self.chars.len() {
            return true;
        }
        !(self.chars[pos - 1].is_alphanumeric() && self.chars[pos].is_alphanumeric())
    }

    /// Largest word boundary in `(floor, pos]`, or `pos` if none exists.
    fn retreat_to_boundary(&self, pos: usize, floor: usize) -> usize {
        let mut p = pos;
        while p > floor + 1 && !self.is_boundary(p) {
            p -= 1;
        }
        if self.is_boundary(p) {
            p
        } else {
            pos
        }
    }

    /// 1-based page range intersecting the char range `[start, end)`.
    fn page_range(&self, start: usize, end: usize) -> (u32, u32) {
        let first = self
            .page_spans
            .partition_point(|span| span.end <= start)
            .min(self.page_spans.len() - 1);
        let last = self
            .page_spans
            .partition_point(|span| span.start < end)
            .saturating_sub(1)
            .max(first);
        (self.page_spans[first].number, self.page_spans[last].number)
    }
}

impl Iterator for ChunkIter {
    type Item = ChunkRecord;

    fn next(&mut self) -> Option<ChunkRecord> {
        if self.done || self.chars.is_empty() || self.next_start >= self.chars.len() {
            return None;
        }

        let start = self.next_start;
        let mut end = (start + self.chunk_size).min(self.chars.len());
        if self.word_boundaries && end < self.chars.len() {
            end = self.retreat_to_boundary(end, start);
        }

        let text: String = self.chars[start..end].iter().collect();
        let (page_start, page_end) = self.page_range(start, end);

        let record = ChunkRecord {
            id: self.next_id,
            text,
            page_start,
            page_end,
            char_start: start,
            char_end: end,
        };
        self.next_id += 1;

        if end >= self.chars.len() {
            // Anything past this start would be a pure suffix of this chunk.
            self.done = true;
        } else if self.word_boundaries {
            let nominal = end.saturating_sub(self.overlap).max(start + 1);
            self.next_start = self.retreat_to_boundary(nominal, start);
        } else {
            self.next_start = start + self.stride;
        }

        Some(record)
    }
}
