//! Chunk storage abstraction.
//!
//! The [`ChunkStore`] trait is the only storage surface the retrieval core
//! needs: replace the whole index at once, and enumerate it. Backends may be
//! relational, document, or in-memory ([`memory::InMemoryStore`]).
//!
//! # Consistency
//!
//! [`replace_all`](ChunkStore::replace_all) must be atomic with respect to
//! [`all`](ChunkStore::all): a reader sees either the previous complete set
//! or the new complete set, never a mix. A failed replace leaves the
//! previous set intact.
//!
//! # Memory
//!
//! [`all`](ChunkStore::all) materializes every chunk, vectors included
//! (roughly `N × D × 4` bytes). That is the intended scale limit of the
//! brute-force ranker.

pub mod memory;

use async_trait::async_trait;

use crate::error::{RagError, Result};
use crate::models::Chunk;

/// Durable collection of `(source, text, vector)` records.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Atomically discard every stored chunk and store `chunks` instead.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidChunk`] if `chunks` violates the store invariants
    /// (see [`validate_chunks`]); [`RagError::Store`] if the backend fails.
    /// In both cases the previous set is left untouched.
    async fn replace_all(&self, chunks: &[Chunk]) -> Result<()>;

    /// Every stored chunk, in stable enumeration (insertion) order.
    async fn all(&self) -> Result<Vec<Chunk>>;

    /// Number of stored chunks.
    async fn count(&self) -> Result<usize> {
        Ok(self.all().await?.len())
    }
}

/// Check the store invariants for a replacement set.
///
/// Every chunk must have non-blank text and a non-empty vector, and all
/// vectors must share one dimension. Returns that dimension, or `None`
/// for an empty set.
pub fn validate_chunks(chunks: &[Chunk]) -> Result<Option<usize>> {
    let mut dims: Option<usize> = None;
    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.text.trim().is_empty() {
            return Err(RagError::InvalidChunk(format!(
                "chunk {} from '{}' has blank text",
                i, chunk.source
            )));
        }
        if chunk.vector.is_empty() {
            return Err(RagError::InvalidChunk(format!(
                "chunk {} from '{}' has an empty vector",
                i, chunk.source
            )));
        }
        match dims {
            None => dims = Some(chunk.dims()),
            Some(d) if d != chunk.dims() => {
                return Err(RagError::DimensionMismatch {
                    expected: d,
                    found: chunk.dims(),
                    source_label: chunk.source.clone(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_consistent_set() {
        let chunks = vec![
            Chunk::new("a.txt", "one", vec![1.0, 0.0]),
            Chunk::new("b.txt", "two", vec![0.0, 1.0]),
        ];
        assert_eq!(validate_chunks(&chunks).unwrap(), Some(2));
        assert_eq!(validate_chunks(&[]).unwrap(), None);
    }

    #[test]
    fn validate_rejects_blank_text() {
        let chunks = vec![Chunk::new("a.txt", "  \n", vec![1.0])];
        assert!(matches!(
            validate_chunks(&chunks),
            Err(RagError::InvalidChunk(_))
        ));
    }

    #[test]
    fn validate_rejects_mixed_dimensions() {
        let chunks = vec![
            Chunk::new("a.txt", "one", vec![1.0, 0.0]),
            Chunk::new("b.txt", "two", vec![0.0, 1.0, 0.0]),
        ];
        match validate_chunks(&chunks) {
            Err(RagError::DimensionMismatch {
                expected,
                found,
                source_label,
            }) => {
                assert_eq!((expected, found), (2, 3));
                assert_eq!(source_label, "b.txt");
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }
}
