//! Retrieve-then-complete answer pipeline

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::retrieval::Retriever;
use crate::security::sanitize_input;

use super::prompt::PromptBuilder;

/// Answers questions from the indexed PDF
#[derive(Clone)]
pub struct AnswerPipeline {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    max_question_length: usize,
}

impl AnswerPipeline {
    pub fn new(
        retriever: Retriever,
        llm: Arc<dyn LlmProvider>,
        temperature: f32,
        max_question_length: usize,
    ) -> Self {
        Self {
            retriever,
            llm,
            temperature,
            max_question_length,
        }
    }

    /// Sanitize, retrieve, prompt and complete.
    ///
    /// An empty retrieval is not an early exit: the placeholder context is
    /// sent to the model like any other.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let start = Instant::now();

        let question = sanitize_input(question, self.max_question_length);
        if question.is_empty() {
            return Err(Error::validation(
                "question is empty after removing disallowed characters",
            ));
        }

        let results = self.retriever.retrieve(&question).await?;
        let context = PromptBuilder::build_context(&results);
        let messages = PromptBuilder::build_messages(&context, &question);

        let answer = self.llm.complete(&messages, self.temperature).await?;

        tracing::info!(
            "Answered with {} context chunks via {} ({}) in {}ms",
            results.len(),
            self.llm.name(),
            self.llm.model(),
            start.elapsed().as_millis()
        );

        Ok(answer)
    }
}
