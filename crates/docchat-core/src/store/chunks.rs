//! Chunk storage

use super::vectors::embedding_to_bytes;
use super::IndexStore;
use crate::error::{DocChatError, Result};
use crate::index::{Chunk, ChunkMetadata};
use rusqlite::{params, OptionalExtension, Row};

impl IndexStore {
    /// Insert chunks together with their embeddings in one transaction.
    ///
    /// `embeddings[i]` belongs to `chunks[i]`; all of it lands or none of it does.
    pub fn insert_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(DocChatError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        self.conn.execute("BEGIN IMMEDIATE", [])?;
        let result = (|| -> Result<()> {
            let mut chunk_stmt = self.conn.prepare(
                "INSERT INTO chunks (seq, source, page, pos, text) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            let mut vec_stmt = self
                .conn
                .prepare("INSERT INTO embeddings (seq, embedding) VALUES (?1, ?2)")?;

            for (chunk, embedding) in chunks.iter().zip(embeddings) {
                let meta = &chunk.metadata;
                chunk_stmt.execute(params![
                    meta.seq,
                    meta.source,
                    meta.page,
                    meta.position as i64,
                    chunk.text
                ])?;
                vec_stmt.execute(params![meta.seq, embedding_to_bytes(embedding)])?;
            }
            Ok(())
        })();

        if result.is_ok() {
            self.conn.execute("COMMIT", [])?;
        } else {
            let _ = self.conn.execute("ROLLBACK", []);
        }
        result
    }

    /// Fetch one chunk by its sequence number
    pub fn get_chunk(&self, seq: u32) -> Result<Option<Chunk>> {
        let chunk = self
            .conn
            .query_row(
                "SELECT seq, source, page, pos, text FROM chunks WHERE seq = ?1",
                params![seq],
                row_to_chunk,
            )
            .optional()?;
        Ok(chunk)
    }

    /// All chunks in document order
    pub fn get_all_chunks(&self) -> Result<Vec<Chunk>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, source, page, pos, text FROM chunks ORDER BY seq")?;
        let chunks = stmt
            .query_map([], row_to_chunk)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(chunks)
    }

    pub fn count_chunks(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<Chunk> {
    let pos: i64 = row.get(3)?;
    Ok(Chunk {
        text: row.get(4)?,
        metadata: ChunkMetadata {
            seq: row.get(0)?,
            source: row.get(1)?,
            page: row.get(2)?,
            position: pos as usize,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(seq: u32, page: u32, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source: "doc.pdf".to_string(),
                page,
                position: 0,
                seq,
            },
        }
    }

    fn store() -> IndexStore {
        let store = IndexStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_insert_and_read_back() {
        let store = store();
        let chunks = vec![chunk(0, 1, "alpha"), chunk(1, 2, "beta")];
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        store.insert_chunks(&chunks, &embeddings).unwrap();

        assert_eq!(store.count_chunks().unwrap(), 2);
        assert_eq!(store.get_chunk(1).unwrap(), Some(chunks[1].clone()));
        assert_eq!(store.get_chunk(9).unwrap(), None);
        assert_eq!(store.get_all_chunks().unwrap(), chunks);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let store = store();
        let err = store
            .insert_chunks(&[chunk(0, 1, "alpha")], &[])
            .unwrap_err();
        assert!(matches!(err, DocChatError::Index(_)));
        assert_eq!(store.count_chunks().unwrap(), 0);
    }

    #[test]
    fn test_failed_insert_rolls_back() {
        let store = store();
        // duplicate seq violates the primary key on the second row
        let chunks = vec![chunk(0, 1, "alpha"), chunk(0, 1, "again")];
        let embeddings = vec![vec![1.0], vec![2.0]];
        assert!(store.insert_chunks(&chunks, &embeddings).is_err());
        assert_eq!(store.count_chunks().unwrap(), 0);
    }
}
