//! Ingestion pipeline orchestration.
//!
//! Coordinates the full rebuild: walk directory → extract text → chunk →
//! embed → replace the store. Files that cannot be extracted or that yield
//! no text are logged and skipped. The store is replaced exactly once, after
//! every file has been embedded, so any failure before that point leaves
//! the previous index untouched.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use grounded_rag_core::chunk::{split_text, ChunkParams};
use grounded_rag_core::embedding::EmbeddingProvider;
use grounded_rag_core::store::ChunkStore;
use grounded_rag_core::Chunk;

use crate::config::{normalize_extension, Config, IngestConfig};
use crate::embedding::{create_provider, DisabledProvider};
use crate::extract::extract_file;
use crate::progress::{IngestProgressEvent, IngestProgressReporter, ProgressMode};
use crate::sqlite_store::SqliteStore;

const DEFAULT_EXCLUDES: [&str; 3] = ["**/.git/**", "**/target/**", "**/node_modules/**"];

/// Which files to ingest and whether to write anything.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Accepted extensions, lowercase without the leading dot.
    pub extensions: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
    /// Scan, extract and chunk only: no embedding calls, no store writes.
    pub dry_run: bool,
}

impl IngestOptions {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            exclude_globs: config.exclude_globs.clone(),
            follow_symlinks: config.follow_symlinks,
            dry_run: false,
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files with an accepted extension found under the directory.
    pub files_scanned: u64,
    /// Files that contributed at least one chunk.
    pub files_processed: u64,
    /// Files dropped because extraction failed or produced no text.
    pub files_skipped: u64,
    /// Chunks committed (or, on a dry run, that would have been).
    pub chunks_written: u64,
}

/// Rebuild `store` from every accepted file under `directory`.
///
/// # Errors
///
/// Fails if the directory does not exist, a glob is invalid, an embedding
/// call fails, or the final `replace_all` fails. In every case the store
/// still holds its previous contents.
pub async fn ingest_directory(
    directory: &Path,
    store: &dyn ChunkStore,
    provider: &dyn EmbeddingProvider,
    params: &ChunkParams,
    options: &IngestOptions,
    progress: &dyn IngestProgressReporter,
) -> Result<IngestReport> {
    let directory = resolve_data_dir(directory)?;
    let directory = directory.as_path();
    progress.report(IngestProgressEvent::Discovering {
        directory: directory.display().to_string(),
    });

    let files = scan_directory(directory, options)?;
    let total = files.len() as u64;
    let label_root = directory.parent().unwrap_or(directory);

    let mut report = IngestReport {
        files_scanned: total,
        ..IngestReport::default()
    };
    let mut pending: Vec<Chunk> = Vec::new();

    for (i, path) in files.iter().enumerate() {
        let source = source_label(label_root, path);

        let text = match extract_file(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(source = %source, error = %e, "skipping file: extraction failed");
                report.files_skipped += 1;
                progress.report(IngestProgressEvent::Ingesting {
                    n: i as u64 + 1,
                    total,
                });
                continue;
            }
        };

        let pieces = split_text(&text, params);
        if pieces.is_empty() {
            info!(source = %source, "skipping file: no text");
            report.files_skipped += 1;
            progress.report(IngestProgressEvent::Ingesting {
                n: i as u64 + 1,
                total,
            });
            continue;
        }

        debug!(source = %source, chunks = pieces.len(), "chunked file");
        report.files_processed += 1;
        report.chunks_written += pieces.len() as u64;

        if !options.dry_run {
            let vectors = provider.embed_batch(&pieces).await?;
            if vectors.len() != pieces.len() {
                bail!(
                    "embedding provider returned {} vectors for {} chunks of {}",
                    vectors.len(),
                    pieces.len(),
                    source
                );
            }
            pending.extend(
                pieces
                    .into_iter()
                    .zip(vectors)
                    .map(|(text, vector)| Chunk::new(source.clone(), text, vector)),
            );
        }

        progress.report(IngestProgressEvent::Ingesting {
            n: i as u64 + 1,
            total,
        });
    }

    if options.dry_run {
        return Ok(report);
    }

    if pending.is_empty() {
        warn!(directory = %directory.display(), "no chunks produced; the index will be empty");
    }
    store.replace_all(&pending).await?;
    info!(
        files = report.files_processed,
        chunks = report.chunks_written,
        "ingest complete"
    );

    Ok(report)
}

/// Absolute, symlink-free form of `directory`, so that `.` and `..` have a
/// real parent to label sources against.
pub fn resolve_data_dir(directory: &Path) -> Result<PathBuf> {
    if !directory.is_dir() {
        bail!("Data directory does not exist: {}", directory.display());
    }
    directory
        .canonicalize()
        .with_context(|| format!("Failed to resolve data directory: {}", directory.display()))
}

/// List accepted files under `directory` in sorted path order.
pub fn scan_directory(directory: &Path, options: &IngestOptions) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        bail!("Data directory does not exist: {}", directory.display());
    }

    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    excludes.extend(options.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let extensions: Vec<String> = options
        .extensions
        .iter()
        .map(|e| normalize_extension(e))
        .collect();

    let mut files = Vec::new();
    let walker = WalkDir::new(directory).follow_links(options.follow_symlinks);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(directory).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }

        let accepted = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.contains(&e.to_lowercase()))
            .unwrap_or(false);
        if accepted {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Path of `path` relative to `root`, with `/` separators.
pub fn source_label(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// CLI entry point for `grag ingest`.
pub async fn run_ingest(
    config: &Config,
    data_dir: Option<PathBuf>,
    dry_run: bool,
    progress_mode: ProgressMode,
) -> Result<()> {
    let directory = data_dir.unwrap_or_else(|| config.ingest.data_dir.clone());
    let params = config.chunking.params()?;
    let options = IngestOptions {
        dry_run,
        ..IngestOptions::from_config(&config.ingest)
    };
    let reporter = progress_mode.reporter();

    let report = if dry_run {
        // Nothing is embedded or written, so neither a credential nor a
        // database is needed.
        let store = grounded_rag_core::store::memory::InMemoryStore::new();
        ingest_directory(
            &directory,
            &store,
            &DisabledProvider,
            &params,
            &options,
            reporter.as_ref(),
        )
        .await?
    } else {
        let provider = create_provider(&config.embedding)?;
        let store = SqliteStore::open(config).await?;
        ingest_directory(
            &directory,
            &store,
            provider.as_ref(),
            &params,
            &options,
            reporter.as_ref(),
        )
        .await?
    };

    if dry_run {
        println!("ingest {} (dry-run)", directory.display());
    } else {
        println!("ingest {}", directory.display());
    }
    println!("  files scanned: {}", report.files_scanned);
    println!("  files processed: {}", report.files_processed);
    println!("  files skipped: {}", report.files_skipped);
    if dry_run {
        println!("  estimated chunks: {}", report.chunks_written);
    } else {
        println!("  chunks written: {}", report.chunks_written);
    }
    println!("ok");

    Ok(())
}
