//! `grag ask`: the full grounded-answer path from the command line.

use anyhow::{Context, Result};
use std::path::Path;

use grounded_rag_core::ConversationTurn;

use crate::config::Config;
use crate::rag::RagService;
use crate::sqlite_store::SqliteStore;

pub async fn run_ask(
    config: &Config,
    query: &str,
    history_path: Option<&Path>,
    top_k: Option<usize>,
) -> Result<()> {
    let history = match history_path {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    let store = SqliteStore::open(config).await?;
    let service = RagService::from_config(config, Box::new(store))?;
    let answer = service.answer(query, &history, top_k).await?;

    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, r) in answer.sources.iter().enumerate() {
            println!("  {}. [{:.4}] {}", i + 1, r.score, r.chunk.source);
        }
    }
    Ok(())
}

/// Read prior turns from a JSON array of `{"role": ..., "content": ...}`.
pub fn load_history(path: &Path) -> Result<Vec<ConversationTurn>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    parse_history(&text).with_context(|| format!("Invalid history file: {}", path.display()))
}

fn parse_history(text: &str) -> Result<Vec<ConversationTurn>> {
    Ok(serde_json::from_str(text)?)
}
