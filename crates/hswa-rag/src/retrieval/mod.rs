//! Query-time retrieval over the read-only vector index

use std::sync::Arc;

use hswa_index::{SearchHit, VectorIndex};

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};

/// Embeds queries and delegates to the vector index.
///
/// The embedder's model identity is verified against the index metadata at
/// construction: querying an index with a different embedder would produce
/// silently-wrong rankings, so a mismatch is a fatal configuration error.
/// Failures in embedding or search propagate directly; there are no retries
/// and no partial results.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    score_threshold: Option<f32>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("index", &self.index)
            .field("score_threshold", &self.score_threshold)
            .finish_non_exhaustive()
    }
}

impl Retriever {
    /// Create a retriever, rejecting embedder/index model mismatches.
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        let indexed_model = &index.metadata().embedding_model;
        if indexed_model != embedder.model_id() {
            return Err(Error::config(format!(
                "index was built with embedding model '{}' but the live embedder is '{}'",
                indexed_model,
                embedder.model_id()
            )));
        }
        if index.metadata().dimensions != embedder.dimensions() {
            return Err(Error::config(format!(
                "index has {} dimensions but the embedder produces {}",
                index.metadata().dimensions,
                embedder.dimensions()
            )));
        }

        Ok(Self {
            index,
            embedder,
            score_threshold: config.score_threshold,
        })
    }

    /// Retrieve the `k` chunks nearest to `query`, best first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query_vector = self.embedder.embed(query).await?;
        let mut hits = self.index.search(&query_vector, k)?;

        if let Some(threshold) = self.score_threshold {
            let before = hits.len();
            hits.retain(|hit| hit.score >= threshold);
            if hits.len() < before {
                tracing::debug!(
                    dropped = before - hits.len(),
                    threshold,
                    "dropped hits below score threshold"
                );
            }
        }

        tracing::debug!(query_len = query.len(), hits = hits.len(), "retrieval complete");
        Ok(hits)
    }

    /// The index this retriever searches
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;
    use async_trait::async_trait;
    use hswa_index::{ChunkRecord, DistanceMetric, IndexMetadata};

    struct FixedEmbedder {
        model: String,
        dims: usize,
        vector: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        fn model_id(&self) -> &str {
            &self.model
        }
    }

    fn metadata(model: &str, dims: usize) -> IndexMetadata {
        IndexMetadata {
            embedding_model: model.to_string(),
            dimensions: dims,
            metric: DistanceMetric::Cosine,
            chunk_size: 500,
            chunk_overlap: 50,
            source: "test".to_string(),
            content_hash: String::new(),
            built_at: chrono::Utc::now(),
        }
    }

    fn record(id: u32, text: &str) -> ChunkRecord {
        ChunkRecord {
            id,
            text: text.to_string(),
            page_start: 1,
            page_end: 1,
            char_start: 0,
            char_end: text.len(),
        }
    }

    fn two_chunk_index(model: &str) -> Arc<VectorIndex> {
        Arc::new(
            VectorIndex::build(
                metadata(model, 2),
                vec![record(0, "near"), record(1, "far")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn model_mismatch_is_a_fatal_config_error() {
        let index = two_chunk_index("all-MiniLM-L6-v2");
        let embedder = Arc::new(FixedEmbedder {
            model: "some-other-model".to_string(),
            dims: 2,
            vector: vec![1.0, 0.0],
        });

        let err =
            Retriever::new(index, embedder, &RetrievalConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("all-MiniLM-L6-v2"));
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected_at_construction() {
        let index = two_chunk_index("m");
        let embedder = Arc::new(FixedEmbedder {
            model: "m".to_string(),
            dims: 3,
            vector: vec![1.0, 0.0, 0.0],
        });

        let err =
            Retriever::new(index, embedder, &RetrievalConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn retrieves_nearest_chunks_best_first() {
        let index = two_chunk_index("m");
        let embedder = Arc::new(FixedEmbedder {
            model: "m".to_string(),
            dims: 2,
            vector: vec![1.0, 0.1],
        });

        let retriever =
            Retriever::new(index, embedder, &RetrievalConfig::default()).unwrap();
        let hits = retriever.retrieve("anything", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "near");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn score_threshold_suppresses_weak_hits() {
        let index = two_chunk_index("m");
        let embedder = Arc::new(FixedEmbedder {
            model: "m".to_string(),
            dims: 2,
            vector: vec![1.0, 0.0],
        });

        let config = RetrievalConfig {
            top_k: 2,
            score_threshold: Some(0.5),
        };
        let retriever = Retriever::new(index, embedder, &config).unwrap();
        let hits = retriever.retrieve("anything", 2).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.text, "near");
    }
}
