//! Prompt templates for RAG generation

use crate::providers::ChatMessage;
use crate::types::ScoredChunk;

/// Context handed to the model when retrieval finds nothing
pub const NO_CONTEXT_PLACEHOLDER: &str = "No relevant information found.";

const SYSTEM_TEMPLATE: &str = r#"You are a helpful assistant that provides clear and well-formatted responses. Follow these guidelines:

1. For simple, direct answers:
   - Provide a concise, clear response
   - Use basic formatting only when needed (bold for emphasis)
   - No need for complex structure

2. For complex or detailed information:
   - Use Markdown formatting for better readability
   - Break down information into logical sections
   - Use headers (##) for main sections
   - Use bullet points for lists
   - Use bold (**) for important information

3. Always:
   - Be direct and clear
   - Use appropriate formatting based on content complexity
   - Maintain readability
   - Say "I don't know" if the context doesn't contain the answer

Context:
{context}

Remember: Adapt your formatting to the complexity of the information. Simple answers should be simple, while complex information can use more structured formatting."#;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts with blank lines, or the placeholder if none
    pub fn build_context(results: &[ScoredChunk]) -> String {
        if results.is_empty() {
            return NO_CONTEXT_PLACEHOLDER.to_string();
        }

        results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// System instructions with the context substituted in
    pub fn build_system_prompt(context: &str) -> String {
        SYSTEM_TEMPLATE.replace("{context}", context)
    }

    /// The two-message prompt: system (instructions + context), then the question
    pub fn build_messages(context: &str, question: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(Self::build_system_prompt(context)),
            ChatMessage::user(question),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatRole;
    use crate::types::Chunk;

    fn scored(text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(text.to_string(), None, 0),
            similarity: 0.5,
        }
    }

    #[test]
    fn test_context_joins_with_blank_line() {
        let context = PromptBuilder::build_context(&[scored("first"), scored("second")]);
        assert_eq!(context, "first\n\nsecond");
    }

    #[test]
    fn test_empty_context_uses_placeholder() {
        assert_eq!(PromptBuilder::build_context(&[]), NO_CONTEXT_PLACEHOLDER);
    }

    #[test]
    fn test_messages() {
        let messages = PromptBuilder::build_messages("Dr. Lee is a cardiologist.", "Who?");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("Context:\nDr. Lee is a cardiologist.\n"));
        assert!(!messages[0].content.contains("{context}"));
        assert_eq!(messages[1], ChatMessage::user("Who?"));
    }
}
