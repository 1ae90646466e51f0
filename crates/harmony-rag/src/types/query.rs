//! Question request type

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Body of `POST /generate/` and `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    /// Check the question is between 1 and `max_chars` characters long
    pub fn validate(&self, max_chars: usize) -> Result<()> {
        let len = self.question.chars().count();
        if len == 0 {
            return Err(Error::validation("question must not be empty"));
        }
        if len > max_chars {
            return Err(Error::validation(format!(
                "question must be at most {} characters, got {}",
                max_chars, len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bounds() {
        assert!(QueryRequest::new("").validate(10).is_err());
        assert!(QueryRequest::new("a").validate(10).is_ok());
        assert!(QueryRequest::new("a".repeat(10)).validate(10).is_ok());
        assert!(QueryRequest::new("a".repeat(11)).validate(10).is_err());
        // characters, not bytes
        assert!(QueryRequest::new("ü".repeat(10)).validate(10).is_ok());
    }
}
