use anyhow::Result;
use sqlx::SqlitePool;

/// Create the chunk table and its index. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            chunk_text TEXT NOT NULL CHECK(length(trim(chunk_text)) > 0),
            embedding BLOB NOT NULL,
            dims INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source)")
        .execute(pool)
        .await?;

    Ok(())
}
