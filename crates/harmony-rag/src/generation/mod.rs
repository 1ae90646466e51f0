//! Answer generation: prompt assembly and the retrieve-then-complete pipeline

pub mod answer;
pub mod prompt;

pub use answer::AnswerPipeline;
pub use prompt::{PromptBuilder, NO_CONTEXT_PLACEHOLDER};
