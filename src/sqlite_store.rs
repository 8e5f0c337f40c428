//! SQLite-backed [`ChunkStore`] implementation.
//!
//! Chunks live in a single `chunks` table with the embedding stored as a
//! little-endian `f32` BLOB. [`ChunkStore::replace_all`] runs the delete and
//! every insert inside one transaction, so readers see either the previous
//! corpus or the new one.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use grounded_rag_core::embedding::{blob_to_vec, vec_to_blob};
use grounded_rag_core::store::{validate_chunks, ChunkStore};
use grounded_rag_core::{Chunk, RagError};

use crate::config::Config;
use crate::{db, migrate};

/// Per-source row in [`StoreStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStats {
    pub source: String,
    pub chunk_count: i64,
    pub last_ingested: Option<i64>,
}

/// Summary of what is currently indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub chunk_count: i64,
    pub source_count: i64,
    /// Vector dimension of the stored corpus, if any chunk exists.
    pub dims: Option<i64>,
    /// Newest `created_at` across all chunks (unix seconds).
    pub last_ingested: Option<i64>,
    pub sources: Vec<SourceStats>,
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and apply migrations.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let chunk_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        let source_count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT source) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        let dims: Option<i64> = sqlx::query_scalar("SELECT dims FROM chunks ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        let last_ingested: Option<i64> = sqlx::query_scalar("SELECT MAX(created_at) FROM chunks")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT source, COUNT(*) AS chunk_count, MAX(created_at) AS last_ingested
            FROM chunks
            GROUP BY source
            ORDER BY chunk_count DESC, source ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let sources = rows
            .iter()
            .map(|row| SourceStats {
                source: row.get("source"),
                chunk_count: row.get("chunk_count"),
                last_ingested: row.get("last_ingested"),
            })
            .collect();

        Ok(StoreStats {
            chunk_count,
            source_count,
            dims,
            last_ingested,
            sources,
        })
    }

    /// Delete-then-insert inside one transaction, without the up-front
    /// validation. Any failing insert rolls the whole batch back.
    async fn write_all(&self, chunks: &[Chunk]) -> std::result::Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chunks").execute(&mut *tx).await?;

        for chunk in chunks {
            sqlx::query(
                "INSERT INTO chunks (source, chunk_text, embedding, dims, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&chunk.source)
            .bind(&chunk.text)
            .bind(vec_to_blob(&chunk.vector))
            .bind(chunk.vector.len() as i64)
            .bind(chunk.created_at.timestamp())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn store_err(e: sqlx::Error) -> RagError {
    RagError::Store(e.to_string())
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn replace_all(&self, chunks: &[Chunk]) -> grounded_rag_core::Result<()> {
        validate_chunks(chunks)?;
        self.write_all(chunks).await.map_err(store_err)?;
        tracing::info!(chunks = chunks.len(), "replaced chunk corpus");
        Ok(())
    }

    async fn all(&self) -> grounded_rag_core::Result<Vec<Chunk>> {
        let rows = sqlx::query(
            "SELECT source, chunk_text, embedding, created_at FROM chunks ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let ts: i64 = row.get("created_at");
                Chunk {
                    source: row.get("source"),
                    text: row.get("chunk_text"),
                    vector: blob_to_vec(&blob),
                    created_at: DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn count(&self) -> grounded_rag_core::Result<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::connect_path(&dir.path().join("test.sqlite"))
            .await
            .unwrap();
        migrate::run_migrations(&pool).await.unwrap();
        (dir, SqliteStore::new(pool))
    }

    fn chunk(source: &str, text: &str, vector: Vec<f32>) -> Chunk {
        Chunk::new(source, text, vector)
    }

    #[tokio::test]
    async fn replace_all_roundtrips_in_order() {
        let (_dir, store) = temp_store().await;
        let chunks = vec![
            chunk("data/a.txt", "alpha", vec![1.0, 0.0, 0.5]),
            chunk("data/b.md", "beta", vec![0.0, 1.0, -0.25]),
            chunk("data/a.txt", "gamma", vec![0.3, 0.3, 0.3]),
        ];
        store.replace_all(&chunks).await.unwrap();

        let loaded = store.all().await.unwrap();
        assert_eq!(loaded.len(), 3);
        for (got, want) in loaded.iter().zip(&chunks) {
            assert_eq!(got.source, want.source);
            assert_eq!(got.text, want.text);
            assert_eq!(got.vector, want.vector);
        }
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn replace_all_discards_previous_corpus() {
        let (_dir, store) = temp_store().await;
        store
            .replace_all(&[chunk("old.txt", "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .replace_all(&[chunk("new.txt", "new", vec![0.0, 1.0])])
            .await
            .unwrap();

        let loaded = store.all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].source, "new.txt");
    }

    #[tokio::test]
    async fn invalid_batch_leaves_store_untouched() {
        let (_dir, store) = temp_store().await;
        store
            .replace_all(&[chunk("keep.txt", "keep me", vec![1.0, 0.0])])
            .await
            .unwrap();

        let err = store
            .replace_all(&[
                chunk("a.txt", "fine", vec![1.0, 0.0]),
                chunk("b.txt", "bad dims", vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));

        let loaded = store.all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "keep me");
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_transaction() {
        let (_dir, store) = temp_store().await;
        store
            .replace_all(&[chunk("keep.txt", "keep me", vec![1.0, 0.0])])
            .await
            .unwrap();

        // Bypass validation: the CHECK constraint rejects the blank row
        // after the delete and the first insert already ran.
        let result = store
            .write_all(&[
                chunk("a.txt", "first", vec![1.0, 0.0]),
                chunk("b.txt", "   ", vec![0.0, 1.0]),
            ])
            .await;
        assert!(result.is_err());

        let loaded = store.all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].source, "keep.txt");
    }

    #[tokio::test]
    async fn stats_summarize_sources() {
        let (_dir, store) = temp_store().await;
        let empty = store.stats().await.unwrap();
        assert_eq!(empty.chunk_count, 0);
        assert_eq!(empty.dims, None);
        assert_eq!(empty.last_ingested, None);

        store
            .replace_all(&[
                chunk("data/a.txt", "one", vec![1.0, 0.0]),
                chunk("data/a.txt", "two", vec![0.0, 1.0]),
                chunk("data/b.txt", "three", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.chunk_count, 3);
        assert_eq!(stats.source_count, 2);
        assert_eq!(stats.dims, Some(2));
        assert!(stats.last_ingested.is_some());
        assert_eq!(stats.sources[0].source, "data/a.txt");
        assert_eq!(stats.sources[0].chunk_count, 2);
    }
}
