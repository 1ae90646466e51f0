//! PDF ingestion for the indexer: text extraction and chunking

mod chunker;
mod parser;

pub use chunker::TextChunker;
pub use parser::{PageText, ParsedPdf, PdfParser};
