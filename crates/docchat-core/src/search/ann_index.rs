//! HNSW approximate nearest neighbor index over chunk embeddings

use crate::store::vectors::cosine_similarity;
use instant_distance::{Builder, HnswMap, Search};

/// Minimum embedding count to justify building an ANN index.
/// Below this threshold, brute-force is fast enough.
pub const ANN_THRESHOLD: usize = 1000;

/// Wrapper for f32 vectors implementing instant_distance::Point
#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance = 1.0 - cosine_similarity
        1.0 - cosine_similarity(&self.values, &other.values)
    }
}

/// HNSW map from embedding to chunk sequence number.
///
/// Built once when an index is created or opened; chunks never change
/// afterwards, so there is no incremental insert.
pub struct AnnIndex {
    map: Option<HnswMap<EmbeddingPoint, u32>>,
    embedding_count: usize,
}

impl AnnIndex {
    pub fn empty() -> Self {
        Self {
            map: None,
            embedding_count: 0,
        }
    }

    /// Build from (seq, embedding) pairs.
    /// Skips building if fewer than `threshold` embeddings.
    pub fn build(embeddings: &[(u32, Vec<f32>)], threshold: usize) -> Self {
        let count = embeddings.len();
        if count < threshold || count == 0 {
            tracing::debug!(
                "Skipping ANN index build: {} embeddings < {} threshold",
                count,
                threshold
            );
            return Self {
                map: None,
                embedding_count: count,
            };
        }

        let (points, keys): (Vec<EmbeddingPoint>, Vec<u32>) = embeddings
            .iter()
            .map(|(seq, values)| {
                (
                    EmbeddingPoint {
                        values: values.clone(),
                    },
                    *seq,
                )
            })
            .unzip();

        let map = Builder::default().build(points, keys);
        tracing::info!("Built ANN index with {} embeddings", count);

        Self {
            map: Some(map),
            embedding_count: count,
        }
    }

    /// Search for k nearest neighbors.
    /// Returns (seq, cosine_similarity) pairs, best first.
    /// Returns empty vec if index not built.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(u32, f32)> {
        let Some(map) = self.map.as_ref() else {
            return vec![];
        };

        let query_point = EmbeddingPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();

        map.search(&query_point, &mut search)
            .take(k)
            .map(|item| (*item.value, 1.0 - item.distance))
            .collect()
    }

    /// Whether the HNSW graph has been built
    pub fn is_built(&self) -> bool {
        self.map.is_some()
    }

    /// Number of embeddings seen (even if the graph wasn't built)
    pub fn len(&self) -> usize {
        self.embedding_count
    }

    pub fn is_empty(&self) -> bool {
        self.embedding_count == 0
    }
}

impl Default for AnnIndex {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embeddings(count: usize) -> Vec<(u32, Vec<f32>)> {
        (0..count)
            .map(|i| {
                let x = i as f32;
                (
                    i as u32,
                    vec![x.sin(), x.cos(), (x * 0.5).sin(), (x * 0.5).cos()],
                )
            })
            .collect()
    }

    #[test]
    fn test_build_below_threshold() {
        let ann = AnnIndex::build(&embeddings(10), ANN_THRESHOLD);
        assert!(!ann.is_built());
        assert_eq!(ann.len(), 10);
        assert!(ann.search(&[0.5, 0.5, 0.5, 0.5], 5).is_empty());
    }

    #[test]
    fn test_build_and_search() {
        let data = embeddings(64);
        let ann = AnnIndex::build(&data, 32);
        assert!(ann.is_built());

        let results = ann.search(&data[7].1, 5);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].0, 7);
        assert!((results[0].1 - 1.0).abs() < 1e-4);
        for (_, sim) in &results {
            assert!(*sim >= -1.0 - 1e-4 && *sim <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn test_search_empty_index() {
        let ann = AnnIndex::empty();
        assert!(ann.search(&[1.0, 0.0], 5).is_empty());
        assert!(!ann.is_built());
        assert!(ann.is_empty());
    }
}
