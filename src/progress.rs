//! Ingest progress reporting.
//!
//! Reports observable progress during `grag ingest` so users see what is
//! being scanned and how much is left. Progress is emitted on **stderr** so
//! stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for ingestion.
#[derive(Clone, Debug, PartialEq)]
pub enum IngestProgressEvent {
    /// Walking the data directory. Total unknown.
    Discovering { directory: String },
    /// `n` of `total` files have been extracted, chunked and embedded.
    Ingesting { n: u64, total: u64 },
}

/// Reports ingest progress. Implementations write to stderr (human or JSON).
pub trait IngestProgressReporter: Send + Sync {
    fn report(&self, event: IngestProgressEvent);
}

/// Human-friendly progress on stderr: "ingest data  1,234 / 5,000 files".
pub struct StderrProgress;

impl IngestProgressReporter for StderrProgress {
    fn report(&self, event: IngestProgressEvent) {
        let line = match &event {
            IngestProgressEvent::Discovering { directory } => {
                format!("ingest {}  discovering...\n", directory)
            }
            IngestProgressEvent::Ingesting { n, total } => {
                format!(
                    "ingest  {} / {} files\n",
                    format_number(*n),
                    format_number(*total)
                )
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl IngestProgressReporter for JsonProgress {
    fn report(&self, event: IngestProgressEvent) {
        if let Ok(line) = serde_json::to_string(&event_json(&event)) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

fn event_json(event: &IngestProgressEvent) -> serde_json::Value {
    match event {
        IngestProgressEvent::Discovering { directory } => serde_json::json!({
            "event": "progress",
            "phase": "discovering",
            "directory": directory
        }),
        IngestProgressEvent::Ingesting { n, total } => serde_json::json!({
            "event": "progress",
            "phase": "ingesting",
            "n": n,
            "total": total
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl IngestProgressReporter for NoProgress {
    fn report(&self, _event: IngestProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn IngestProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
