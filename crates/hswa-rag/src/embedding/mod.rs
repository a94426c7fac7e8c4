//! Text embedding providers

pub mod onnx;

use async_trait::async_trait;

use crate::error::Result;

pub use onnx::OnnxEmbedder;

/// Trait for mapping text to fixed-dimension vectors.
///
/// Implementations must be deterministic for a given model version and input,
/// and `embed_batch` must return vectors in input order. An embedder is
/// constructed once by the caller and reused for the process lifetime; it is
/// never reconstructed implicitly.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed multiple texts, preserving input order.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// with real batch support should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Verify the provider can produce a vector of the declared dimensionality.
    ///
    /// Used at startup to fail fast on a missing or corrupt model artifact.
    async fn health_check(&self) -> Result<()> {
        let vector = self.embed("health check").await?;
        if vector.len() != self.dimensions() {
            return Err(crate::error::Error::embedding(format!(
                "model '{}' produced {} dimensions, expected {}",
                self.model_id(),
                vector.len(),
                self.dimensions()
            )));
        }
        Ok(())
    }

    /// Embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Model identifier, compared against index metadata at query time
    fn model_id(&self) -> &str;
}
