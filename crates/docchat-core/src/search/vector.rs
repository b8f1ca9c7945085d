//! Brute-force vector similarity ranking

use crate::store::vectors::cosine_similarity;

/// Score every stored embedding against `query` and keep the best `limit`.
///
/// Ties keep document order so results are deterministic.
pub fn rank_by_similarity(
    query: &[f32],
    embeddings: &[(u32, Vec<f32>)],
    limit: usize,
) -> Vec<(u32, f32)> {
    let mut similarities: Vec<(u32, f32)> = embeddings
        .iter()
        .map(|(seq, embedding)| (*seq, cosine_similarity(query, embedding)))
        .collect();

    similarities.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    similarities.truncate(limit);
    similarities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_orders_and_truncates() {
        let stored = vec![
            (0, vec![0.0, 1.0]),
            (1, vec![1.0, 0.0]),
            (2, vec![0.7, 0.7]),
        ];
        let ranked = rank_by_similarity(&[1.0, 0.1], &stored, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 2);
    }

    #[test]
    fn test_rank_ties_keep_document_order() {
        let stored = vec![(5, vec![1.0, 0.0]), (3, vec![1.0, 0.0])];
        let ranked = rank_by_similarity(&[1.0, 0.0], &stored, 5);
        assert_eq!(ranked.iter().map(|r| r.0).collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_by_similarity(&[1.0], &[], 3).is_empty());
    }
}
