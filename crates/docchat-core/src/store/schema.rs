//! Index database schema and initialization

use crate::error::{DocChatError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Handle on one document's index database
pub struct IndexStore {
    pub(crate) conn: Connection,
    path: PathBuf,
}

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- Index-level facts (JSON values)
CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Chunk text and provenance, seq is the document order
CREATE TABLE IF NOT EXISTS chunks (
    seq INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    page INTEGER NOT NULL,
    pos INTEGER NOT NULL,
    text TEXT NOT NULL
);

-- One embedding per chunk, little-endian f32 BLOB
CREATE TABLE IF NOT EXISTS embeddings (
    seq INTEGER PRIMARY KEY REFERENCES chunks(seq),
    embedding BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

/// Facts recorded about an index when it is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Path the document was loaded from
    pub source: String,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// Embedding model used for every chunk; queries must use the same one
    pub embedding_model: String,
    pub dimensions: usize,
    pub page_count: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

impl IndexStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an in-memory database (tests and throwaway indexes)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create tables and record the schema version
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(CREATE_TABLES)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Fail unless the database was written by a compatible schema
    pub fn check_schema(&self) -> Result<()> {
        let version: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| DocChatError::Index(format!("Not a docchat index: {}", e)))?
            .flatten();

        match version {
            Some(SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(DocChatError::Index(format!(
                "Unsupported index schema version {} (expected {})",
                other, SCHEMA_VERSION
            ))),
            None => Err(DocChatError::Index(
                "Index database has no schema version".to_string(),
            )),
        }
    }

    pub fn set_meta(&self, meta: &IndexMeta) -> Result<()> {
        let json = serde_json::to_string(meta)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('index', ?1)",
            params![json],
        )?;
        Ok(())
    }

    pub fn get_meta(&self) -> Result<Option<IndexMeta>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'index'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta() -> IndexMeta {
        IndexMeta {
            source: "/tmp/report.pdf".to_string(),
            content_hash: "abc123".to_string(),
            embedding_model: "all-minilm".to_string(),
            dimensions: 384,
            page_count: 3,
            chunk_count: 12,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_and_check_schema() {
        let store = IndexStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store.check_schema().unwrap();
        // idempotent
        store.initialize().unwrap();
        store.check_schema().unwrap();
    }

    #[test]
    fn test_meta_roundtrip_on_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("idx").join("index.sqlite");
        let meta = sample_meta();
        {
            let store = IndexStore::open(&path).unwrap();
            store.initialize().unwrap();
            assert!(store.get_meta().unwrap().is_none());
            store.set_meta(&meta).unwrap();
        }

        let reopened = IndexStore::open(&path).unwrap();
        reopened.check_schema().unwrap();
        assert_eq!(reopened.get_meta().unwrap(), Some(meta));
    }

    #[test]
    fn test_check_schema_on_foreign_database() {
        let store = IndexStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch("CREATE TABLE unrelated (x INTEGER);")
            .unwrap();
        assert!(store.check_schema().is_err());
    }
}
