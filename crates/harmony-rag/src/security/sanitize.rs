//! Question sanitizing and secret masking

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

static SCRIPT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script pattern")
});

const STRIPPED_CHARS: &[char] = &['<', '>', '{', '}', '(', ')', '[', ']', '\\', '/'];

/// Strip markup-like content from user input and cap its length.
///
/// This is a denylist, not a parser: it removes `<...>` fragments,
/// `<script>` blocks and the characters `<>{}()[]\/`, then trims and
/// truncates to `max_chars` characters.
pub fn sanitize_input(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = TAG_PATTERN.replace_all(text, "");
    let text = SCRIPT_PATTERN.replace_all(&text, "");
    let text: String = text.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    let text = text.trim();

    if text.chars().count() > max_chars {
        tracing::warn!("Input text truncated to {} characters", max_chars);
        let truncated: String = text.chars().take(max_chars).collect();
        // the cut can land after whitespace
        return truncated.trim_end().to_string();
    }

    text.to_string()
}

/// Mask a secret for logging, keeping only the first and last two characters.
pub fn mask_secret(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        "*".repeat(chars.len())
    } else {
        let first: String = chars[..2].iter().collect();
        let last: String = chars[chars.len() - 2..].iter().collect();
        format!("{}{}{}", first, "*".repeat(chars.len() - 4), last)
    }
}
