//! In-memory [`ChunkStore`] for tests and embedding in other processes.
//!
//! The chunk set lives behind `std::sync::RwLock<Arc<Vec<Chunk>>>`.
//! A replace builds the new set off-lock and swaps the `Arc` in one write,
//! so readers only ever see a complete set.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{RagError, Result};
use crate::models::Chunk;

use super::{validate_chunks, ChunkStore};

/// In-memory chunk store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    chunks: RwLock<Arc<Vec<Chunk>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap handle to the current snapshot.
    pub fn snapshot(&self) -> Result<Arc<Vec<Chunk>>> {
        let guard = self.chunks.read().map_err(|_| poisoned())?;
        Ok(Arc::clone(&guard))
    }
}

fn poisoned() -> RagError {
    RagError::Store("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn replace_all(&self, chunks: &[Chunk]) -> Result<()> {
        validate_chunks(chunks)?;
        let next = Arc::new(chunks.to_vec());
        let mut guard = self.chunks.write().map_err(|_| poisoned())?;
        *guard = next;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Chunk>> {
        Ok(self.snapshot()?.as_ref().clone())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.snapshot()?.len())
    }
}
