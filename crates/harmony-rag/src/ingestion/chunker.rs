//! Sentence-aware text chunking with overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::Chunk;

use super::parser::PageText;

/// Text chunker with configurable size and overlap, both in characters
pub struct TextChunker {
    /// Maximum chunk size
    chunk_size: usize,
    /// Characters carried over from the end of the previous chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. The overlap is clamped below the chunk size.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        if overlap >= chunk_size {
            tracing::warn!(
                "Chunk overlap {} is not smaller than chunk size {}; clamping",
                overlap,
                chunk_size
            );
        }
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Chunk every page, numbering chunks across the whole document
    pub fn chunk_pages(&self, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for text in self.split_text(&page.content) {
                let index = u32::try_from(chunks.len()).unwrap_or(u32::MAX);
                chunks.push(Chunk::new(text, Some(page.page), index));
            }
        }

        chunks
    }

    /// Split text into chunks of at most `chunk_size` characters.
    ///
    /// Breaks prefer sentence boundaries, then word boundaries. A single word
    /// longer than the chunk size is kept whole.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in self.pieces(text) {
            let piece_len = piece.chars().count();

            if current_len > 0 && current_len + piece_len > self.chunk_size {
                push_trimmed(&mut chunks, &current);

                current = self.overlap_text(&current);
                current_len = current.chars().count();
                if current_len + piece_len > self.chunk_size {
                    current.clear();
                    current_len = 0;
                }
            }

            current.push_str(piece);
            current_len += piece_len;
        }

        push_trimmed(&mut chunks, &current);
        chunks
    }

    /// Sentences, with over-long sentences broken into words
    fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut pieces = Vec::new();
        for sentence in text.split_sentence_bounds() {
            if sentence.chars().count() <= self.chunk_size {
                pieces.push(sentence);
            } else {
                pieces.extend(sentence.split_word_bounds());
            }
        }
        pieces
    }

    /// Tail of a chunk to repeat at the start of the next one, starting at a
    /// word boundary when there is one
    fn overlap_text(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }

        let total = text.chars().count();
        if total <= self.overlap {
            return text.to_string();
        }

        let start = text
            .char_indices()
            .nth(total - self.overlap)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let tail = &text[start..];

        match tail.find(char::is_whitespace) {
            Some(pos) => tail[pos..].trim_start().to_string(),
            None => tail.to_string(),
        }
    }
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        chunks.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        (1..=40)
            .map(|i| format!("Clinic note number {} covers visiting hours and parking.", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = TextChunker::new(500, 50);
        assert_eq!(
            chunker.split_text("  Harmony Clinic opens at 8am.  "),
            vec!["Harmony Clinic opens at 8am."]
        );
        assert!(chunker.split_text("   ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size() {
        let chunker = TextChunker::new(200, 40);
        let chunks = chunker.split_text(&sample_text());

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 200, "chunk too long: {}", chunk);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = TextChunker::new(200, 40);
        let chunks = chunker.split_text(&sample_text());

        for pair in chunks.windows(2) {
            let head: String = pair[1].chars().take(10).collect();
            assert!(
                pair[0].contains(&head),
                "{:?} does not continue {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_long_sentence_split_on_words() {
        let chunker = TextChunker::new(50, 0);
        let sentence = "word ".repeat(40);
        let chunks = chunker.split_text(&sentence);

        assert!(chunks.len() >= 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
    }

    #[test]
    fn test_chunk_pages_numbers_across_pages() {
        let chunker = TextChunker::new(500, 50);
        let pages = vec![
            PageText {
                page: 0,
                content: "Welcome to Harmony Clinic.".to_string(),
            },
            PageText {
                page: 3,
                content: "Dr. Lee leads cardiology.".to_string(),
            },
        ];

        let chunks = chunker.chunk_pages(&pages);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, Some(0));
        assert_eq!(chunks[1].page, Some(3));
        assert_eq!(chunks[1].chunk_index, 1);
        assert!(chunks.iter().all(|c| c.embedding.is_empty()));
    }

    #[test]
    fn test_overlap_clamped() {
        let chunker = TextChunker::new(10, 50);
        assert_eq!(chunker.overlap, 9);
    }
}
