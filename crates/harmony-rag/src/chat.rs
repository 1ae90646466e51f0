//! Canned answers for `POST /chat/`

use std::collections::HashMap;

/// Reply for any question not in the table
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I don't have an answer to that yet. \
Please contact our front desk at +1-555-44-44 for further assistance.";

const DEFAULT_ENTRIES: &[(&str, &str)] = &[(
    "How can I book an appointment?",
    "You can book an appointment by calling our front desk at +1-555-44-44 or visiting our website.",
)];

/// Exact-match question → answer table, built once at startup
#[derive(Debug, Clone)]
pub struct CannedResponses {
    entries: HashMap<String, String>,
    fallback: String,
}

impl Default for CannedResponses {
    fn default() -> Self {
        Self::new(
            DEFAULT_ENTRIES
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string())),
            FALLBACK_RESPONSE,
        )
    }
}

impl CannedResponses {
    pub fn new(
        entries: impl IntoIterator<Item = (String, String)>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            fallback: fallback.into(),
        }
    }

    /// Answer for `question`; no normalization beyond what the caller did
    pub fn lookup(&self, question: &str) -> &str {
        match self.entries.get(question) {
            Some(answer) => answer,
            None => {
                tracing::debug!("No canned response for question, using fallback");
                &self.fallback
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_question() {
        let canned = CannedResponses::default();
        assert_eq!(
            canned.lookup("How can I book an appointment?"),
            "You can book an appointment by calling our front desk at +1-555-44-44 or visiting our website."
        );
    }

    #[test]
    fn test_exact_match_only() {
        let canned = CannedResponses::default();
        assert_eq!(canned.lookup("how can i book an appointment?"), FALLBACK_RESPONSE);
        assert_eq!(canned.lookup("How can I book an appointment"), FALLBACK_RESPONSE);
        assert_eq!(canned.lookup("Where is parking?"), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_custom_table() {
        let canned = CannedResponses::new(
            [("ping".to_string(), "pong".to_string())],
            "unknown",
        );
        assert_eq!(canned.len(), 1);
        assert_eq!(canned.lookup("ping"), "pong");
        assert_eq!(canned.lookup("pang"), "unknown");
    }
}
