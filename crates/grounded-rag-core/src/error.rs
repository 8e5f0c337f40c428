//! Error types for the retrieval core.

use thiserror::Error;

/// Errors raised by chunking, embedding, ranking, storage, and completion.
#[derive(Debug, Error)]
pub enum RagError {
    /// A required credential or model identifier is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider could not be reached or is not configured.
    #[error("Provider unavailable ({provider}): {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// The provider rejected the request (rate limit, invalid request, ...).
    #[error("Provider error ({provider}, status {status}): {message}")]
    Provider {
        provider: String,
        status: u16,
        message: String,
    },

    /// A stored vector and the query vector disagree on dimension.
    #[error("Dimension mismatch for '{source_label}': expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        source_label: String,
    },

    /// Blank text was submitted where content is required.
    #[error("Input text is empty")]
    EmptyInput,

    /// Chunking parameters that cannot make forward progress.
    #[error("Invalid chunking parameters: chunk_size={chunk_size}, overlap={overlap} (need chunk_size > 0 and overlap < chunk_size)")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    /// A chunk violates the store invariants (blank text, bad vector).
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    /// The storage backend failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl RagError {
    /// True when callers should report "service unavailable / not configured"
    /// instead of a per-request failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            RagError::Configuration(_) | RagError::ProviderUnavailable { .. }
        )
    }
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, RagError>;
