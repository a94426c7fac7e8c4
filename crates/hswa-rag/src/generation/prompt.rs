//! Structured prompt builder for grounded Q&A
//!
//! The instruction text is a fixed, versioned constant rather than an
//! interpolated template: the builder takes typed fields (context hits and the
//! question) and renders a single payload. The instructions direct the model
//! to answer only from the supplied context, cite sections and pages, and
//! decline explicitly when the context is insufficient.

use hswa_index::SearchHit;

/// Version tag for the instruction text; bump when the wording changes.
pub const PROMPT_VERSION: &str = "hswa-qa/1";

/// Fixed instruction block prepended to every query.
const INSTRUCTIONS: &str = "\
You are a WorkSafe New Zealand expert assistant specializing in the Health and Safety at Work Act 2015.

Your task is to answer questions based ONLY on the provided context from the Act. You must follow these rules:

1. ALWAYS cite specific sections when making claims (e.g., \"According to Section 36...\")
2. Include the page number from the context tags in your citations
3. If the answer is not in the provided context, say \"I don't have enough information in the Act to answer that.\"
4. Be precise and professional - this is legal/regulatory content
5. Quote directly from the Act when appropriate";

/// A grounded Q&A prompt: fixed instructions, tagged context, one question
pub struct QaPrompt<'a> {
    question: &'a str,
    context: &'a [SearchHit],
}

impl<'a> QaPrompt<'a> {
    /// Build a prompt from a question and its retrieval result
    pub fn new(question: &'a str, context: &'a [SearchHit]) -> Self {
        Self { question, context }
    }

    /// Render the full text payload sent to the generation model.
    pub fn render(&self) -> String {
        let mut prompt = String::with_capacity(
            INSTRUCTIONS.len()
                + self
                    .context
                    .iter()
                    .map(|h| h.chunk.text.len() + 32)
                    .sum::<usize>()
                + self.question.len()
                + 128,
        );

        prompt.push_str(INSTRUCTIONS);
        prompt.push_str("\n\nContext from HSWA 2015:\n");

        if self.context.is_empty() {
            prompt.push_str("(no relevant context was found)\n");
        }

        for hit in self.context {
            prompt.push('[');
            prompt.push_str(&hit.chunk.page_label());
            prompt.push_str("]\n");
            prompt.push_str(&hit.chunk.text);
            prompt.push_str("\n\n");
        }

        prompt.push_str("Question: ");
        prompt.push_str(self.question);
        prompt.push_str("\n\nAnswer:");
        prompt
    }
}
