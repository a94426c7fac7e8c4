//! Configuration for the retrieval pipeline
//!
//! Defaults reproduce the deployed assistant: 500/50 character chunking,
//! all-MiniLM-L6-v2 embeddings (384 dims, cosine), top-4 retrieval, and a
//! deterministic (temperature 0) Claude generation call.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Ingestion inputs and outputs
    pub ingestion: IngestionConfig,
    /// Chunking parameters
    pub chunking: ChunkingConfig,
    /// Embedding model configuration
    pub embedding: EmbeddingConfig,
    /// Query-time retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Hosted LLM configuration
    pub llm: LlmConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config '{}': {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration before any processing begins.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::config("embedding dimensions must be greater than zero"));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::config("embedding batch_size must be greater than zero"));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval top_k must be at least 1"));
        }
        Ok(())
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Source PDF path
    pub pdf_path: PathBuf,
    /// Output path for the serialized index artifact
    pub index_path: PathBuf,
    /// Source label recorded in the index and shown in citations
    pub source_label: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::from("hswa-docs/Health and Safety at Work Act 2015.pdf"),
            index_path: PathBuf::from("data/hswa.idx"),
            source_label: "Health and Safety at Work Act 2015".to_string(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Pull chunk boundaries back to word boundaries instead of raw offsets
    pub word_boundaries: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            word_boundaries: false,
        }
    }
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Sentence-transformers model name
    pub model: String,
    /// Embedding dimensionality (384 for MiniLM)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum token sequence length
    pub max_length: usize,
    /// Cache directory for the downloaded model artifact
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hswa-rag")
                .join("models"),
        }
    }
}

/// Query-time retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
    /// Optional similarity floor; hits below it are dropped. When unset,
    /// exactly top_k chunks are returned and the prompt handles weak context.
    pub score_threshold: Option<f32>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
        }
    }
}

/// Hosted LLM configuration (Anthropic messages API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API version header value
    pub api_version: String,
    /// Sampling temperature; 0 for deterministic, accuracy-focused answers
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds; exceeding it is a reported failure
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_version: "2023-06-01".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            timeout_secs: 60,
        }
    }
}
