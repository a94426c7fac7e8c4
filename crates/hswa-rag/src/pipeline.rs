//! End-to-end pipeline glue
//!
//! [`Ingestor`] runs the offline path: load PDF, chunk, embed, build the
//! vector index, persist one artifact. [`Assistant`] runs the online path:
//! embed the question, retrieve, generate, link citations. The two never run
//! in the same process in deployment, but nothing prevents it.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use hswa_index::{DistanceMetric, IndexMetadata, VectorIndex};

use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::citation::link_citations;
use crate::generation::{AnswerComposer, LlmProvider};
use crate::ingestion::{Chunker, PdfLoader};
use crate::retrieval::Retriever;
use crate::types::QueryResponse;

/// Summary of a completed ingestion run
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Pages extracted from the source PDF
    pub pages: usize,
    /// Chunks produced and indexed
    pub chunks: usize,
    /// Embedding dimensionality
    pub dimensions: usize,
    /// Total ingestion time in milliseconds
    pub elapsed_ms: u64,
}

/// Offline ingestion: PDF to persisted index artifact
pub struct Ingestor {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Ingestor {
    pub fn new(config: RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { config, embedder }
    }

    /// Run the full ingestion pipeline and persist the index artifact.
    ///
    /// Any stage failure aborts the run; nothing is written unless every
    /// stage succeeded.
    pub async fn ingest(&self) -> Result<IndexStats> {
        let started = Instant::now();

        let document = PdfLoader::load(
            &self.config.ingestion.pdf_path,
            &self.config.ingestion.source_label,
        )?;
        let content_hash = document.content_hash();

        let chunker = Chunker::new(&self.config.chunking)?;
        let records: Vec<_> = chunker.chunks(&document).collect();
        let mean_len = if records.is_empty() {
            0
        } else {
            records.iter().map(|r| r.text.chars().count()).sum::<usize>() / records.len()
        };
        tracing::info!(
            pages = document.page_count(),
            chunks = records.len(),
            mean_chunk_chars = mean_len,
            "chunked document"
        );

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let metadata = IndexMetadata {
            embedding_model: self.embedder.model_id().to_string(),
            dimensions: self.embedder.dimensions(),
            metric: DistanceMetric::Cosine,
            chunk_size: self.config.chunking.chunk_size,
            chunk_overlap: self.config.chunking.chunk_overlap,
            source: self.config.ingestion.source_label.clone(),
            content_hash,
            built_at: chrono::Utc::now(),
        };

        let pages = document.page_count();
        let dimensions = metadata.dimensions;
        let index = VectorIndex::build(metadata, records, vectors)?;

        if let Some(parent) = self.config.ingestion.index_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        index.persist(&self.config.ingestion.index_path)?;

        let stats = IndexStats {
            pages,
            chunks: index.len(),
            dimensions,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            path = %self.config.ingestion.index_path.display(),
            chunks = stats.chunks,
            elapsed_ms = stats.elapsed_ms,
            "index persisted"
        );
        Ok(stats)
    }
}

/// Online question answering over a loaded index
pub struct Assistant {
    retriever: Retriever,
    composer: AnswerComposer,
    top_k: usize,
}

impl Assistant {
    /// Wire a retriever and composer from loaded parts.
    ///
    /// Fails if the embedder does not match the index metadata.
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        config: &RagConfig,
    ) -> Result<Self> {
        let retriever = Retriever::new(index, embedder, &config.retrieval)?;
        Ok(Self {
            retriever,
            composer: AnswerComposer::new(llm),
            top_k: config.retrieval.top_k,
        })
    }

    /// Load the persisted index artifact and wire an assistant over it.
    pub fn from_artifact(
        index_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        config: &RagConfig,
    ) -> Result<Self> {
        let index = Arc::new(VectorIndex::load(index_path)?);
        tracing::info!(
            path = %index_path.display(),
            chunks = index.len(),
            model = %index.metadata().embedding_model,
            "loaded index"
        );
        Self::new(index, embedder, llm, config)
    }

    /// Answer one question: retrieve, generate, link citations.
    pub async fn ask(&self, question: &str) -> Result<QueryResponse> {
        let started = Instant::now();

        let hits = self.retriever.retrieve(question, self.top_k).await?;
        let chunks_retrieved = hits.len();

        let answer = self.composer.compose(question, hits).await?;
        let citations = link_citations(&answer.text, &answer.sources);

        Ok(QueryResponse {
            answer: answer.text,
            citations,
            chunks_retrieved,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Metadata of the index being queried
    pub fn index_metadata(&self) -> &IndexMetadata {
        self.retriever.index().metadata()
    }

    /// Number of chunks in the index
    pub fn index_len(&self) -> usize {
        self.retriever.index().len()
    }
}
