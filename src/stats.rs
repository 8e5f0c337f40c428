//! Index statistics.
//!
//! Provides a quick summary of what's indexed: chunk counts, vector
//! dimension, and a per-source breakdown. Used by `grag stats` to confirm
//! that an ingest run produced what was expected.

use anyhow::Result;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let stats = store.stats().await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Grounded RAG - Index Stats");
    println!("==========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Chunks:      {}", stats.chunk_count);
    println!("  Sources:     {}", stats.source_count);
    match stats.dims {
        Some(d) => println!("  Dimensions:  {}", d),
        None => println!("  Dimensions:  -"),
    }
    println!(
        "  Last ingest: {}",
        stats
            .last_ingested
            .map(format_ts_relative)
            .unwrap_or_else(|| "never".to_string())
    );

    if !stats.sources.is_empty() {
        println!();
        println!("  By source:");
        println!("  {:<40} {:>8}   {}", "SOURCE", "CHUNKS", "INGESTED");
        println!("  {}", "-".repeat(68));
        for s in &stats.sources {
            let ingested = s
                .last_ingested
                .map(format_ts_relative)
                .unwrap_or_else(|| "never".to_string());
            println!("  {:<40} {:>8}   {}", s.source, s.chunk_count, ingested);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp relative to now (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;

    if delta < 0 {
        format_ts_iso(ts)
    } else if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn relative_timestamps() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_ts_relative(now), "just now");
        assert_eq!(format_ts_relative(now - 7200), "2 hours ago");
        assert_eq!(format_ts_relative(now - 86400), "1 day ago");
    }
}
