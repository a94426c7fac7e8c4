//! Local ONNX embedder (all-MiniLM-L6-v2)
//!
//! Runs the sentence-transformers MiniLM model through ONNX Runtime with mean
//! pooling and L2 normalization, matching the deployed assistant's embeddings.
//! The model and tokenizer artifacts are downloaded into the cache directory
//! on first use and reused afterward; the session is guarded by a mutex since
//! inference requires exclusive access.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use tokenizers::Tokenizer;

use crate::config::EmbeddingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};

/// ONNX-based local text embedder
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_id: String,
    dimensions: usize,
    max_length: usize,
    batch_size: usize,
}

impl OnnxEmbedder {
    /// Load (downloading on first use) the model named in the config.
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.cache_dir).map_err(|e| {
            Error::config(format!(
                "cannot create model cache '{}': {e}",
                config.cache_dir.display()
            ))
        })?;

        let model_path = config.cache_dir.join(format!("{}.onnx", config.model));
        let tokenizer_path = config.cache_dir.join(format!("{}.tokenizer.json", config.model));

        if !model_path.exists() {
            fetch_artifact(&config.model, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            fetch_artifact(&config.model, "tokenizer.json", &tokenizer_path).await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::embedding(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::embedding(format!("optimization level: {e}")))?
            .with_intra_threads(4)
            .map_err(|e| Error::embedding(format!("thread config: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::embedding(format!("model load: {e}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::embedding(format!("tokenizer load: {e}")))?;

        tracing::info!(model = %config.model, dimensions = config.dimensions, "ONNX embedder ready");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_id: config.model.clone(),
            dimensions: config.dimensions,
            max_length: config.max_length,
            batch_size: config.batch_size,
        })
    }

    fn run_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::embedding(format!("tokenization: {e}")))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.max_length);

        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();
            for col in 0..ids.len().min(seq_len) {
                input_ids[row * seq_len + col] = ids[col] as i64;
                attention_mask[row * seq_len + col] = mask[col] as i64;
                token_type_ids[row * seq_len + col] = types[col] as i64;
            }
        }

        let shape = vec![batch_size, seq_len];
        let ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))
            .map_err(|e| Error::embedding(format!("input tensor: {e}")))?;
        let mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))
                .map_err(|e| Error::embedding(format!("mask tensor: {e}")))?;
        let types_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))
            .map_err(|e| Error::embedding(format!("type tensor: {e}")))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(vec![
                ("input_ids", ids_tensor.into_dyn()),
                ("attention_mask", mask_tensor.into_dyn()),
                ("token_type_ids", types_tensor.into_dyn()),
            ])
            .map_err(|e| Error::embedding(format!("inference: {e}")))?;

        let collected: Vec<_> = outputs.iter().collect();
        let hidden = collected
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| collected.first())
            .map(|(_, value)| value)
            .ok_or_else(|| Error::embedding("model produced no output tensor"))?;

        let (tensor_shape, data) = hidden
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::embedding(format!("output tensor: {e}")))?;

        let dims: Vec<usize> = tensor_shape.iter().map(|&d| d as usize).collect();
        let hidden_size = dims.get(2).copied().unwrap_or(self.dimensions);

        Ok(mean_pool_normalized(
            data,
            &attention_mask,
            batch_size,
            seq_len,
            hidden_size,
        ))
    }
}

/// Attention-masked mean pooling followed by L2 normalization.
fn mean_pool_normalized(
    hidden: &[f32],
    attention_mask: &[i64],
    batch_size: usize,
    seq_len: usize,
    hidden_size: usize,
) -> Vec<Vec<f32>> {
    let mut vectors = Vec::with_capacity(batch_size);

    for row in 0..batch_size {
        let mut pooled = vec![0.0f32; hidden_size];
        let mut token_count = 0.0f32;

        for col in 0..seq_len {
            if attention_mask[row * seq_len + col] == 0 {
                continue;
            }
            let base = row * seq_len * hidden_size + col * hidden_size;
            for (k, value) in pooled.iter_mut().enumerate() {
                if let Some(x) = hidden.get(base + k) {
                    *value += x;
                }
            }
            token_count += 1.0;
        }

        if token_count > 0.0 {
            for value in &mut pooled {
                *value /= token_count;
            }
        }

        let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut pooled {
                *value /= norm;
            }
        }

        vectors.push(pooled);
    }

    vectors
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.run_batch(std::slice::from_ref(&text.to_string()))?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("empty embedding result"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.run_batch(batch)?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Download one model artifact from the sentence-transformers hub.
async fn fetch_artifact(model: &str, file: &str, dest: &Path) -> Result<()> {
    let url = format!("https://huggingface.co/sentence-transformers/{model}/resolve/main/{file}");
    tracing::info!(%url, "downloading model artifact");

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::embedding(format!("download failed: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::embedding(format!(
            "download of {file} failed: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::embedding(format!("download read failed: {e}")))?;

    write_atomically(dest, &bytes)?;
    tracing::info!(file, bytes = bytes.len(), "artifact cached");
    Ok(())
}

/// Write via a temp file so an interrupted download never leaves a truncated
/// artifact that a later run would treat as cached.
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let tmp: PathBuf = dest.with_extension("part");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pooling_averages_masked_tokens() {
        // 1 row, 3 tokens, hidden size 2, last token masked out
        let hidden = [1.0, 0.0, 3.0, 0.0, 100.0, 100.0];
        let mask = [1i64, 1, 0];
        let vectors = mean_pool_normalized(&hidden, &mask, 1, 3, 2);

        // mean of (1,0) and (3,0) is (2,0); normalized to (1,0)
        assert_eq!(vectors.len(), 1);
        assert!((vectors[0][0] - 1.0).abs() < 1e-6);
        assert!(vectors[0][1].abs() < 1e-6);
    }

    #[test]
    fn pooled_vectors_are_unit_length() {
        let hidden = [3.0, 4.0, 3.0, 4.0];
        let mask = [1i64, 1];
        let vectors = mean_pool_normalized(&hidden, &mask, 1, 2, 2);
        let norm: f32 = vectors[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn all_masked_row_stays_zero() {
        let hidden = [1.0, 2.0];
        let mask = [0i64];
        let vectors = mean_pool_normalized(&hidden, &mask, 1, 1, 2);
        assert_eq!(vectors[0], vec![0.0, 0.0]);
    }
}
