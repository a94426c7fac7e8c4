//! Index construction and exact nearest-neighbor search

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::metric::DistanceMetric;

/// A chunk of source text with its provenance, as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Stable chunk identifier: position in the original chunk sequence
    pub id: u32,
    /// Text content
    pub text: String,
    /// First 1-based page this chunk intersects
    pub page_start: u32,
    /// Last 1-based page this chunk intersects
    pub page_end: u32,
    /// Character offset range in the concatenated document text
    pub char_start: usize,
    pub char_end: usize,
}

impl ChunkRecord {
    /// Human-readable page reference, e.g. "Page 3" or "Pages 3-4"
    pub fn page_label(&self) -> String {
        if self.page_start == self.page_end {
            format!("Page {}", self.page_start)
        } else {
            format!("Pages {}-{}", self.page_start, self.page_end)
        }
    }
}

/// Index-level metadata persisted alongside the vectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Identifier of the embedding model that produced every vector
    pub embedding_model: String,
    /// Vector dimensionality shared by all entries
    pub dimensions: usize,
    /// Distance metric fixed at build time
    pub metric: DistanceMetric,
    /// Chunking parameters used at ingestion
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Source document label
    pub source: String,
    /// SHA-256 of the source document text
    pub content_hash: String,
    /// Build timestamp
    pub built_at: chrono::DateTime<chrono::Utc>,
}

/// One search result: a chunk and its similarity score
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched chunk
    pub chunk: ChunkRecord,
    /// Similarity score under the index metric (higher is better)
    pub score: f32,
}

/// Read-only in-memory vector index over one document's chunks
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    metadata: IndexMetadata,
    records: Vec<ChunkRecord>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from parallel record and vector sequences.
    ///
    /// Fails if the sequences differ in length or any vector does not match
    /// the dimensionality declared in the metadata. The insertion order is
    /// preserved and used for deterministic tie-breaking at search time.
    pub fn build(
        metadata: IndexMetadata,
        records: Vec<ChunkRecord>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if records.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                records: records.len(),
                vectors: vectors.len(),
            });
        }

        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != metadata.dimensions {
                return Err(IndexError::DimensionMismatch {
                    position,
                    expected: metadata.dimensions,
                    actual: vector.len(),
                });
            }
        }

        tracing::debug!(
            entries = records.len(),
            dimensions = metadata.dimensions,
            metric = %metadata.metric,
            "built vector index"
        );

        Ok(Self {
            metadata,
            records,
            vectors,
        })
    }

    /// Index metadata
    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the stored chunk records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.records.iter()
    }

    /// Return the `k` chunks nearest to `query`, best first.
    ///
    /// Ties are broken by original insertion order, so identical inputs always
    /// produce identical rankings. `k` larger than the index returns every
    /// entry. A query of the wrong dimensionality is an error, not a zero hit.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.metadata.dimensions {
            return Err(IndexError::QueryDimensionMismatch {
                expected: self.metadata.dimensions,
                actual: query.len(),
            });
        }

        let metric = self.metadata.metric;
        let mut order: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .map(|v| metric.score(query, v))
            .enumerate()
            .collect();

        order.sort_by(|(ia, sa), (ib, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(ia.cmp(ib))
        });

        Ok(order
            .into_iter()
            .take(k)
            .map(|(i, score)| SearchHit {
                chunk: self.records[i].clone(),
                score,
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_metadata(dimensions: usize) -> IndexMetadata {
        IndexMetadata {
            embedding_model: "test-embedder".to_string(),
            dimensions,
            metric: DistanceMetric::Cosine,
            chunk_size: 500,
            chunk_overlap: 50,
            source: "test document".to_string(),
            content_hash: "0".repeat(64),
            built_at: chrono::Utc::now(),
        }
    }

    pub(crate) fn record(id: u32, text: &str) -> ChunkRecord {
        ChunkRecord {
            id,
            text: text.to_string(),
            page_start: 1,
            page_end: 1,
            char_start: 0,
            char_end: text.len(),
        }
    }

    #[test]
    fn build_rejects_length_mismatch() {
        let err = VectorIndex::build(
            test_metadata(2),
            vec![record(0, "a")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::LengthMismatch { .. }));
    }

    #[test]
    fn build_rejects_inconsistent_dimensions() {
        let err = VectorIndex::build(
            test_metadata(2),
            vec![record(0, "a"), record(1, "b")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.5]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch { position: 1, .. }
        ));
    }

    #[test]
    fn search_orders_best_first() {
        let index = VectorIndex::build(
            test_metadata(2),
            vec![record(0, "x"), record(1, "y"), record(2, "z")],
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]],
        )
        .unwrap();

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].chunk.id, 1);
        assert_eq!(hits[1].chunk.id, 2);
        assert_eq!(hits[2].chunk.id, 0);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn search_breaks_ties_by_insertion_order() {
        let index = VectorIndex::build(
            test_metadata(2),
            vec![record(0, "first"), record(1, "second")],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].chunk.id, 0);
        assert_eq!(hits[1].chunk.id, 1);
    }

    #[test]
    fn search_with_large_k_returns_every_chunk_once() {
        let index = VectorIndex::build(
            test_metadata(2),
            vec![record(0, "a"), record(1, "b"), record(2, "c")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
        )
        .unwrap();

        let hits = index.search(&[1.0, 0.0], 100).unwrap();
        assert_eq!(hits.len(), 3);
        let mut ids: Vec<u32> = hits.iter().map(|h| h.chunk.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn search_rejects_wrong_query_dimensions() {
        let index = VectorIndex::build(
            test_metadata(2),
            vec![record(0, "a")],
            vec![vec![1.0, 0.0]],
        )
        .unwrap();

        let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::QueryDimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn empty_index_searches_to_nothing() {
        let index = VectorIndex::build(test_metadata(2), vec![], vec![]).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 4).unwrap().is_empty());
    }

    #[test]
    fn page_label_formats_single_and_range() {
        let mut r = record(0, "a");
        assert_eq!(r.page_label(), "Page 1");
        r.page_end = 2;
        assert_eq!(r.page_label(), "Pages 1-2");
    }
}
