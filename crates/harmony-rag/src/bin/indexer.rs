//! Builds the vector index from the clinic PDF
//!
//! Run with: cargo run -p harmony-rag --bin harmony-indexer -- --pdf data/harmony.pdf

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use harmony_rag::{
    config::Settings,
    ingestion::{PdfParser, TextChunker},
    logging,
    providers::{EmbeddingProvider, LocalVectorStore, OpenAiClient, VectorStoreProvider},
};

/// Parse, chunk and embed a PDF into the local vector store
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF to index (defaults to PDF_PATH)
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Vector store file (defaults to VECTOR_STORE_PATH)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Add to the existing index instead of replacing it
    #[arg(long)]
    append: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::from_env().context("Failed to load settings")?;
    logging::init(&settings.logging)?;
    settings.log_loaded();

    let start = Instant::now();
    let pdf_path = args.pdf.unwrap_or_else(|| settings.vector_db.pdf_path.clone());
    let store_path = args
        .store
        .unwrap_or_else(|| settings.vector_db.storage_path.clone());

    let parsed = PdfParser::parse_file(&pdf_path)
        .with_context(|| format!("Failed to parse {}", pdf_path.display()))?;
    tracing::info!("Extracted {} pages from {}", parsed.pages.len(), pdf_path.display());

    let chunker = TextChunker::from_config(&settings.chunking);
    let chunks = chunker.chunk_pages(&parsed.pages);
    tracing::info!(
        "Split into {} chunks (size {}, overlap {})",
        chunks.len(),
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap
    );

    let client = OpenAiClient::new(&settings.llm)?;
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = client
        .embed_batch(&texts)
        .await
        .context("Failed to embed chunks")?;

    let chunks: Vec<_> = chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| chunk.with_embedding(embedding))
        .collect();
    let count = chunks.len();

    let store = if args.append {
        LocalVectorStore::open(&store_path)?
    } else {
        LocalVectorStore::create(&store_path)
    };
    store.insert(chunks).await?;
    store.save()?;

    tracing::info!(
        "Indexed {} chunks into {} in {:.1}s",
        count,
        store_path.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
