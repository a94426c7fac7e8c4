//! Answer composition: prompt assembly plus the generation call

use std::sync::Arc;

use hswa_index::SearchHit;

use crate::error::Result;
use crate::generation::prompt::QaPrompt;
use crate::generation::LlmProvider;
use crate::types::Answer;

/// Formats retrieved chunks and the question into a prompt, sends it to the
/// generation model, and pairs the raw response with the sources used.
pub struct AnswerComposer {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerComposer {
    /// Create a composer over the given generation provider
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Generate an answer grounded on the retrieval result.
    ///
    /// Service failures propagate unmodified. An empty retrieval result is not
    /// an error: the prompt instructs the model to state that the context is
    /// insufficient rather than fabricate an answer.
    pub async fn compose(&self, question: &str, sources: Vec<SearchHit>) -> Result<Answer> {
        let prompt = QaPrompt::new(question, &sources).render();

        tracing::info!(
            model = %self.llm.model(),
            context_chunks = sources.len(),
            "generating answer"
        );

        let text = self.llm.complete(&prompt).await?;

        Ok(Answer { text, sources })
    }
}
