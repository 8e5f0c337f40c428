//! `grag search`: retrieval without generation.
//!
//! Embeds the query, ranks every stored chunk, and prints the top results
//! with their cosine scores. Useful for checking what `grag ask` would be
//! grounded on.

use anyhow::Result;

use grounded_rag_core::embedding::embed_text;
use grounded_rag_core::rank::rank;
use grounded_rag_core::store::ChunkStore;
use grounded_rag_core::RankedResult;

use crate::config::Config;
use crate::embedding::create_provider;
use crate::sqlite_store::SqliteStore;

const EXCERPT_CHARS: usize = 240;

pub async fn run_search(config: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    let provider = create_provider(&config.embedding)?;
    let store = SqliteStore::open(config).await?;

    let query_vector = embed_text(provider.as_ref(), query).await?;
    let corpus = store.all().await?;
    let results = rank(&query_vector, &corpus, top_k.unwrap_or(config.retrieval.top_k))?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for line in format_results(&results) {
        println!("{}", line);
    }
    Ok(())
}

fn format_results(results: &[RankedResult]) -> Vec<String> {
    let mut lines = Vec::with_capacity(results.len() * 3);
    for (i, result) in results.iter().enumerate() {
        lines.push(format!("{}. [{:.4}] {}", i + 1, result.score, result.chunk.source));
        lines.push(format!("    excerpt: \"{}\"", excerpt(&result.chunk.text)));
        lines.push(String::new());
    }
    lines
}

/// Single-line excerpt of at most [`EXCERPT_CHARS`] characters.
fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat.to_string();
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}
