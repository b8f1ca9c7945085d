//! Vector storage operations
//!
//! Stores embeddings as BLOBs and computes cosine similarity in Rust.

use super::IndexStore;
use crate::error::Result;

impl IndexStore {
    /// Get all embeddings keyed by chunk sequence number
    pub fn get_all_embeddings(&self) -> Result<Vec<(u32, Vec<f32>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, embedding FROM embeddings ORDER BY seq")?;

        let results = stmt
            .query_map([], |row| {
                let seq: u32 = row.get(0)?;
                let embedding_bytes: Vec<u8> = row.get(1)?;
                Ok((seq, bytes_to_embedding(&embedding_bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    pub fn count_embeddings(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Chunk, ChunkMetadata};

    #[test]
    fn test_embedding_bytes_are_little_endian() {
        let bytes = embedding_to_bytes(&[1.0f32]);
        assert_eq!(bytes, 1.0f32.to_le_bytes().to_vec());
        assert_eq!(bytes_to_embedding(&bytes), vec![1.0]);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(sim.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_or_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_embeddings_stored_with_chunks() {
        let store = IndexStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        let chunks: Vec<Chunk> = (0..3)
            .map(|i| Chunk {
                text: format!("chunk {}", i),
                metadata: ChunkMetadata {
                    source: "doc.pdf".to_string(),
                    page: 1,
                    position: i * 10,
                    seq: i as u32,
                },
            })
            .collect();
        let embeddings = vec![vec![0.5, -1.5], vec![2.0, 0.0], vec![0.0, 3.25]];
        store.insert_chunks(&chunks, &embeddings).unwrap();

        assert_eq!(store.count_embeddings().unwrap(), 3);
        let stored = store.get_all_embeddings().unwrap();
        assert_eq!(stored[2], (2, vec![0.0, 3.25]));
    }
}
