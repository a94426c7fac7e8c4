//! Retrieval-augmented question answering over the NZ Health and Safety at
//! Work Act 2015.
//!
//! The crate covers both halves of the system. The offline half ingests the
//! Act's PDF into a persisted vector index: per-page text extraction,
//! overlapping character-window chunking, and local ONNX sentence embeddings.
//! The online half answers questions against that artifact: embed the
//! question, retrieve the nearest chunks, generate a grounded answer through
//! the Anthropic messages API, and link the answer's section and page
//! references back to the chunks that supplied them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hswa_rag::{Assistant, RagConfig};
//! use hswa_rag::embedding::OnnxEmbedder;
//! use hswa_rag::generation::AnthropicClient;
//!
//! # async fn run() -> hswa_rag::Result<()> {
//! let config = RagConfig::default();
//! let embedder = Arc::new(OnnxEmbedder::new(&config.embedding).await?);
//! let llm = Arc::new(AnthropicClient::new(&config.llm, std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())?);
//!
//! let assistant = Assistant::from_artifact(&config.ingestion.index_path, embedder, llm, &config)?;
//! let response = assistant.ask("What is a PCBU's primary duty of care?").await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, GenerationErrorKind, Result};
pub use pipeline::{Assistant, IndexStats, Ingestor};
pub use retrieval::Retriever;
pub use types::{Answer, Citation, Document, Page, QueryResponse};
