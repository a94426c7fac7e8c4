//! End-to-end pipeline tests with a deterministic embedder
//!
//! The hosted pieces (PDF extraction, ONNX inference, the generation API) are
//! replaced with deterministic stand-ins so the chunk -> embed -> index ->
//! retrieve -> answer path can be exercised hermetically.

use std::sync::Arc;

use async_trait::async_trait;

use hswa_index::{DistanceMetric, IndexMetadata, VectorIndex};
use hswa_rag::config::{ChunkingConfig, RagConfig, RetrievalConfig};
use hswa_rag::embedding::EmbeddingProvider;
use hswa_rag::generation::LlmProvider;
use hswa_rag::ingestion::Chunker;
use hswa_rag::retrieval::Retriever;
use hswa_rag::types::Document;
use hswa_rag::{Assistant, Error, Result};

const DIMS: usize = 32;

/// Deterministic bag-of-words embedder: hashes each word into a bucket and
/// L2-normalizes the counts. Crude, but texts sharing words land near each
/// other under cosine, which is all retrieval ranking needs here.
struct BagOfWordsEmbedder {
    model: String,
}

impl BagOfWordsEmbedder {
    fn new() -> Self {
        Self {
            model: "bag-of-words-test".to_string(),
        }
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let mut counts = vec![0.0f32; DIMS];
        for word in text.split_whitespace() {
            let word: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let bucket = word
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
                % DIMS;
            counts[bucket] += 1.0;
        }
        let norm = counts.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut counts {
                *value /= norm;
            }
        }
        counts
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vectorize(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

struct CannedLlm {
    reply: String,
}

#[async_trait]
impl LlmProvider for CannedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "canned"
    }
}

fn filler(sentence: &str, total: usize) -> String {
    let mut text = String::with_capacity(total + sentence.len());
    while text.len() < total {
        text.push_str(sentence);
        text.push(' ');
    }
    text
}

/// A small multi-page act-like document with distinctive phrases on known
/// pages.
fn test_document() -> Document {
    let page1 = format!(
        "Workers must be consulted on health and safety matters. {}",
        filler("Engagement with workers is required at every workplace.", 600)
    );
    let page2 = format!(
        "A PCBU has the primary duty of care to ensure the health and safety of workers. {}",
        filler("The duty extends to others affected by the work.", 600)
    );
    let page3 = filler("Offences and penalties apply for reckless conduct.", 600);

    Document::from_pages("test act", vec![page1, page2, page3])
}

async fn build_index(
    doc: &Document,
    chunking: &ChunkingConfig,
    embedder: &BagOfWordsEmbedder,
) -> VectorIndex {
    let chunker = Chunker::new(chunking).unwrap();
    let records: Vec<_> = chunker.chunks(doc).collect();
    let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await.unwrap();

    let metadata = IndexMetadata {
        embedding_model: embedder.model_id().to_string(),
        dimensions: embedder.dimensions(),
        metric: DistanceMetric::Cosine,
        chunk_size: chunking.chunk_size,
        chunk_overlap: chunking.chunk_overlap,
        source: doc.source.clone(),
        content_hash: doc.content_hash(),
        built_at: chrono::Utc::now(),
    };

    VectorIndex::build(metadata, records, vectors).unwrap()
}

#[tokio::test]
async fn embedding_the_same_text_twice_is_deterministic() {
    let embedder = BagOfWordsEmbedder::new();
    let text = "A PCBU must ensure, so far as is reasonably practicable, the health and safety of workers.";
    let a = embedder.embed(text).await.unwrap();
    let b = embedder.embed(text).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn first_chunk_covers_the_opening_sentence_on_page_one() {
    let doc = test_document();
    let chunking = ChunkingConfig::default();
    let chunker = Chunker::new(&chunking).unwrap();

    let first = chunker.chunks(&doc).next().unwrap();
    assert!(first
        .text
        .contains("Workers must be consulted on health and safety matters"));
    assert_eq!(first.page_start, 1);
    assert_eq!(first.char_start, 0);
    assert!(first.text.chars().count() <= 500);
}

#[tokio::test]
async fn distinctive_phrase_retrieves_its_chunk_in_the_top_results() {
    let doc = test_document();
    let embedder = BagOfWordsEmbedder::new();
    let index = Arc::new(build_index(&doc, &ChunkingConfig::default(), &embedder).await);

    let retriever = Retriever::new(
        index,
        Arc::new(BagOfWordsEmbedder::new()),
        &RetrievalConfig::default(),
    )
    .unwrap();

    let hits = retriever
        .retrieve("What is the primary duty of care?", 4)
        .await
        .unwrap();

    assert!(!hits.is_empty());
    assert!(hits.len() <= 4);
    assert!(
        hits.iter()
            .any(|hit| hit.chunk.text.contains("primary duty of care")),
        "expected a chunk containing the queried phrase in the top results"
    );
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn persisted_index_round_trips_and_rejects_a_different_embedder() {
    let doc = test_document();
    let embedder = BagOfWordsEmbedder::new();
    let index = build_index(&doc, &ChunkingConfig::default(), &embedder).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("act.idx");
    index.persist(&path).unwrap();

    let loaded = Arc::new(VectorIndex::load(&path).unwrap());
    assert_eq!(loaded.len(), index.len());
    assert_eq!(loaded.metadata().embedding_model, "bag-of-words-test");
    assert_eq!(loaded.metadata().content_hash, doc.content_hash());

    // Same artifact, wrong embedder: fatal at construction.
    let mismatched = Arc::new(BagOfWordsEmbedder {
        model: "all-MiniLM-L6-v2".to_string(),
    });
    let err = Retriever::new(loaded, mismatched, &RetrievalConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("bag-of-words-test"));
}

#[tokio::test]
async fn assistant_answers_with_linked_citations() {
    let doc = test_document();
    let embedder = BagOfWordsEmbedder::new();
    let index = Arc::new(build_index(&doc, &ChunkingConfig::default(), &embedder).await);

    let llm = Arc::new(CannedLlm {
        reply: "According to the Act, a PCBU has the primary duty of care (page 2)."
            .to_string(),
    });

    let assistant = Assistant::new(
        index,
        Arc::new(BagOfWordsEmbedder::new()),
        llm,
        &RagConfig::default(),
    )
    .unwrap();

    let response = assistant
        .ask("What is the primary duty of care?")
        .await
        .unwrap();

    assert!(response.answer.contains("primary duty of care"));
    assert!(response.chunks_retrieved > 0);
    assert!(!response.citations.is_empty());
    // The answer cites page 2, so every linked citation must cover it.
    assert!(response
        .citations
        .iter()
        .all(|c| c.page_start <= 2 && c.page_end >= 2));
}
