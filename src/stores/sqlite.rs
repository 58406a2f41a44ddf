//! SQLite-backed chunk store.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use super::{ChunkRecord, ChunkStore};
use crate::types::ScoutError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS document_chunks (
    id TEXT PRIMARY KEY,
    document_id TEXT NOT NULL,
    page_number INTEGER NOT NULL,
    chunk_index INTEGER NOT NULL,
    chunk_text TEXT NOT NULL,
    term_weights TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_document_chunks_document
    ON document_chunks (document_id);
";

/// Chunk store persisted in SQLite via `tokio-rusqlite`.
///
/// Term vectors are stored as JSON in the `term_weights` column. Replacement
/// runs as a single transaction (delete + inserts), so a reader never
/// observes a document mid-swap; `all_chunks` orders by rowid, which is the
/// store's stable insertion order.
#[derive(Clone)]
pub struct SqliteChunkStore {
    conn: Connection,
}

impl SqliteChunkStore {
    /// Open (or create) the store at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ScoutError> {
        let conn = Connection::open(path)
            .await
            .map_err(|err| ScoutError::Storage(err.to_string()))?;
        Self::init(&conn).await?;
        Ok(Self { conn })
    }

    /// Open a fresh store that lives only as long as the connection.
    pub async fn open_in_memory() -> Result<Self, ScoutError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|err| ScoutError::Storage(err.to_string()))?;
        Self::init(&conn).await?;
        Ok(Self { conn })
    }

    async fn init(conn: &Connection) -> Result<(), ScoutError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)
                .map_err(tokio_rusqlite::Error::from)
        })
        .await
        .map_err(|err| ScoutError::Storage(err.to_string()))
    }
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn replace_chunks(
        &self,
        document_id: &str,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), ScoutError> {
        let document_id = document_id.to_string();
        let mut rows = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let weights = serde_json::to_string(&chunk.term_weights)?;
            rows.push((
                chunk.id,
                chunk.document_id,
                i64::from(chunk.page_number),
                chunk.chunk_index as i64,
                chunk.text,
                weights,
            ));
        }

        self.conn
            .call(move |conn| -> tokio_rusqlite::Result<()> {
                let tx = conn
                    .transaction()
                    .map_err(tokio_rusqlite::Error::from)?;
                tx.execute(
                    "DELETE FROM document_chunks WHERE document_id = ?1",
                    [&document_id],
                )
                .map_err(tokio_rusqlite::Error::from)?;
                for (id, doc_id, page_number, chunk_index, text, weights) in rows {
                    tx.execute(
                        "INSERT INTO document_chunks \
                         (id, document_id, page_number, chunk_index, chunk_text, term_weights) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        (id, doc_id, page_number, chunk_index, text, weights),
                    )
                    .map_err(tokio_rusqlite::Error::from)?;
                }
                tx.commit().map_err(tokio_rusqlite::Error::from)?;
                Ok(())
            })
            .await
            .map_err(|err| ScoutError::Storage(err.to_string()))
    }

    async fn all_chunks(&self) -> Result<Vec<ChunkRecord>, ScoutError> {
        self.conn
            .call(|conn| -> tokio_rusqlite::Result<Vec<ChunkRecord>> {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, document_id, page_number, chunk_index, chunk_text, term_weights \
                         FROM document_chunks ORDER BY rowid",
                    )
                    .map_err(tokio_rusqlite::Error::from)?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(ChunkRecord {
                            id: row.get(0)?,
                            document_id: row.get(1)?,
                            page_number: row.get::<_, i64>(2)? as u32,
                            chunk_index: row.get::<_, i64>(3)? as usize,
                            text: row.get(4)?,
                            term_weights: row
                                .get::<_, String>(5)
                                .map(|raw| serde_json::from_str(&raw).unwrap_or_default())
                                .unwrap_or_default(),
                        })
                    })
                    .map_err(tokio_rusqlite::Error::from)?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row.map_err(tokio_rusqlite::Error::from)?);
                }
                Ok(records)
            })
            .await
            .map_err(|err| ScoutError::Storage(err.to_string()))
    }

    async fn chunks_for_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<ChunkRecord>, ScoutError> {
        let document_id = document_id.to_string();
        self.conn
            .call(move |conn| -> tokio_rusqlite::Result<Vec<ChunkRecord>> {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, document_id, page_number, chunk_index, chunk_text, term_weights \
                         FROM document_chunks WHERE document_id = ?1 ORDER BY chunk_index",
                    )
                    .map_err(tokio_rusqlite::Error::from)?;
                let rows = stmt
                    .query_map([&document_id], |row| {
                        Ok(ChunkRecord {
                            id: row.get(0)?,
                            document_id: row.get(1)?,
                            page_number: row.get::<_, i64>(2)? as u32,
                            chunk_index: row.get::<_, i64>(3)? as usize,
                            text: row.get(4)?,
                            term_weights: row
                                .get::<_, String>(5)
                                .map(|raw| serde_json::from_str(&raw).unwrap_or_default())
                                .unwrap_or_default(),
                        })
                    })
                    .map_err(tokio_rusqlite::Error::from)?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row.map_err(tokio_rusqlite::Error::from)?);
                }
                Ok(records)
            })
            .await
            .map_err(|err| ScoutError::Storage(err.to_string()))
    }

    async fn count(&self) -> Result<usize, ScoutError> {
        self.conn
            .call(|conn| -> tokio_rusqlite::Result<usize> {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM document_chunks", [], |row| row.get(0))
                    .map_err(tokio_rusqlite::Error::from)?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| ScoutError::Storage(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::vectorize;

    fn record(document_id: &str, chunk_index: usize, text: &str) -> ChunkRecord {
        ChunkRecord::new(document_id, chunk_index, 1, text)
            .with_term_weights(vectorize(text))
    }

    #[tokio::test]
    async fn roundtrips_chunks_with_term_weights() {
        let store = SqliteChunkStore::open_in_memory().await.unwrap();
        let original = record("doc", 0, "machine learning systems");
        store
            .replace_chunks("doc", vec![original.clone()])
            .await
            .unwrap();

        let loaded = store.chunks_for_document("doc").await.unwrap();
        assert_eq!(loaded, vec![original]);
    }

    #[tokio::test]
    async fn replace_is_a_full_swap() {
        let store = SqliteChunkStore::open_in_memory().await.unwrap();
        store
            .replace_chunks(
                "doc",
                vec![record("doc", 0, "old a"), record("doc", 1, "old b")],
            )
            .await
            .unwrap();
        store
            .replace_chunks("doc", vec![record("doc", 0, "new")])
            .await
            .unwrap();

        let chunks = store.chunks_for_document("doc").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "new");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn all_chunks_orders_by_insertion() {
        let store = SqliteChunkStore::open_in_memory().await.unwrap();
        store
            .replace_chunks("a", vec![record("a", 0, "a0"), record("a", 1, "a1")])
            .await
            .unwrap();
        store
            .replace_chunks("b", vec![record("b", 0, "b0")])
            .await
            .unwrap();

        let texts: Vec<String> = store
            .all_chunks()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["a0", "a1", "b0"]);
    }

    #[tokio::test]
    async fn persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.sqlite");

        {
            let store = SqliteChunkStore::open(&path).await.unwrap();
            store
                .replace_chunks("doc", vec![record("doc", 0, "durable")])
                .await
                .unwrap();
        }

        let reopened = SqliteChunkStore::open(&path).await.unwrap();
        let chunks = reopened.chunks_for_document("doc").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "durable");
    }
}
