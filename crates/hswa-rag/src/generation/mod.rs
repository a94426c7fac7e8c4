//! Prompt assembly, answer generation, and citation linking

pub mod anthropic;
pub mod citation;
pub mod composer;
pub mod prompt;

use async_trait::async_trait;

use crate::error::Result;

pub use anthropic::AnthropicClient;
pub use composer::AnswerComposer;
pub use prompt::QaPrompt;

/// Trait for hosted answer generation.
///
/// Implementations send a finished prompt to a completion service and return
/// the raw text response. Failures are surfaced unmodified; retry policy, if
/// any, belongs to the calling layer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the prompt and return the model's raw text response
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model name, for logging
    fn model(&self) -> &str;
}
