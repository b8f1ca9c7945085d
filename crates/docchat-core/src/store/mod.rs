//! Persistence for a single document's retrieval index
//!
//! One SQLite file per loaded document holding:
//! - chunk text and page provenance
//! - one embedding BLOB per chunk
//! - index metadata (source, embedding model, dimensions)

mod chunks;
mod schema;
pub mod vectors;

pub use schema::{IndexMeta, IndexStore};
use sha2::{Digest, Sha256};

/// File name of the database inside an index directory
pub const INDEX_DB_FILE: &str = "index.sqlite";

/// SHA-256 of content, hex encoded
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content_is_stable() {
        assert_eq!(hash_content("hello"), hash_content("hello"));
        assert_ne!(hash_content("hello"), hash_content("hello!"));
        assert_eq!(hash_content("").len(), 64);
    }
}
