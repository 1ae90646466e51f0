//! PDF text extraction with per-page output

use std::path::Path;

use crate::error::{Error, Result};

/// Text of one PDF page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page number (0-indexed)
    pub page: u32,
    /// Cleaned text content
    pub content: String,
}

/// Extracted PDF
#[derive(Debug, Clone)]
pub struct ParsedPdf {
    /// Pages in document order; pages without text are dropped
    pub pages: Vec<PageText>,
}

impl ParsedPdf {
    /// Total characters across all pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.content.chars().count()).sum()
    }
}

/// PDF parser backed by `pdf-extract`
pub struct PdfParser;

impl PdfParser {
    /// Read and parse the PDF at `path`
    pub fn parse_file(path: &Path) -> Result<ParsedPdf> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Parse(format!("failed to read {}: {}", path.display(), e)))?;
        tracing::info!("Parsing {} ({} bytes)", path.display(), data.len());
        Self::parse_bytes(&data)
    }

    /// Parse an in-memory PDF
    pub fn parse_bytes(data: &[u8]) -> Result<ParsedPdf> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::Parse(format!("pdf-extract failed: {}", e)))?;

        let parsed = ParsedPdf {
            pages: split_pages(&text),
        };

        if parsed.pages.is_empty() {
            return Err(Error::Parse(
                "No text content could be extracted from PDF".to_string(),
            ));
        }

        tracing::debug!(
            "Extracted {} pages, {} characters",
            parsed.pages.len(),
            parsed.char_count()
        );
        Ok(parsed)
    }
}

/// Split extracted text on form feeds (page breaks) and clean each page
pub(crate) fn split_pages(text: &str) -> Vec<PageText> {
    text.split('\x0c')
        .enumerate()
        .filter_map(|(index, raw)| {
            let content = cleanup_text(raw);
            if content.is_empty() {
                return None;
            }
            Some(PageText {
                page: u32::try_from(index).unwrap_or(u32::MAX),
                content,
            })
        })
        .collect()
}

/// Normalize typographic characters and drop blank lines
pub(crate) fn cleanup_text(text: &str) -> String {
    let text = text
        .replace('\0', "")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace('\u{2014}', "--")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2022}', "* ")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_text() {
        let raw = "  Our \u{FB01}rst clinic\u{00A0}opened in 1998.  \n\n\u{2022}Open \u{2018}daily\u{2019}\0\n";
        assert_eq!(
            cleanup_text(raw),
            "Our first clinic opened in 1998.\n* Open 'daily'"
        );
    }

    #[test]
    fn test_split_pages() {
        let text = "Welcome to Harmony.\n\x0c\n \n\x0cCardiology is on floor 2.\n";
        let pages = split_pages(text);

        assert_eq!(
            pages,
            vec![
                PageText {
                    page: 0,
                    content: "Welcome to Harmony.".to_string()
                },
                PageText {
                    page: 2,
                    content: "Cardiology is on floor 2.".to_string()
                },
            ]
        );
    }
}
