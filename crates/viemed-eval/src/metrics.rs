//! Standard IR metrics over retrieved id lists, binary relevance.
//!
//! Each function takes per-query retrieved ids and ground-truth relevant ids
//! and averages over queries.

use std::collections::HashSet;

/// Mean Reciprocal Rank@K: 1/rank of the first relevant document, 0 when no
/// relevant document appears in the top-k.
pub fn mrr_at_k(results: &[Vec<String>], relevant: &[Vec<String>], k: usize) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let mut reciprocal_ranks = Vec::with_capacity(results.len());
    for (retrieved, rel) in results.iter().zip(relevant.iter()) {
        let rel: HashSet<&String> = rel.iter().collect();
        let rr = retrieved
            .iter()
            .take(k)
            .position(|id| rel.contains(id))
            .map_or(0.0, |pos| 1.0 / (pos as f64 + 1.0));
        reciprocal_ranks.push(rr);
    }
    mean(&reciprocal_ranks)
}

/// Recall@K: retrieved ∩ relevant / |relevant|. Queries without relevant
/// documents are skipped.
pub fn recall_at_k(results: &[Vec<String>], relevant: &[Vec<String>], k: usize) -> f64 {
    let mut recalls = Vec::new();
    for (retrieved, rel) in results.iter().zip(relevant.iter()) {
        if rel.is_empty() {
            continue;
        }
        let rel_set: HashSet<&String> = rel.iter().collect();
        let hit = retrieved
            .iter()
            .take(k)
            .collect::<HashSet<_>>()
            .iter()
            .filter(|id| rel_set.contains(**id))
            .count();
        recalls.push(hit as f64 / rel_set.len() as f64);
    }
    mean(&recalls)
}

/// Precision@K: retrieved ∩ relevant / k.
pub fn precision_at_k(results: &[Vec<String>], relevant: &[Vec<String>], k: usize) -> f64 {
    if results.is_empty() || k == 0 {
        return 0.0;
    }
    let mut precisions = Vec::with_capacity(results.len());
    for (retrieved, rel) in results.iter().zip(relevant.iter()) {
        let rel_set: HashSet<&String> = rel.iter().collect();
        let hit = retrieved
            .iter()
            .take(k)
            .collect::<HashSet<_>>()
            .iter()
            .filter(|id| rel_set.contains(**id))
            .count();
        precisions.push(hit as f64 / k as f64);
    }
    mean(&precisions)
}

/// NDCG@K with binary gains: DCG uses `1/log2(rank+1)`, normalized by the
/// ideal ranking (all relevant documents first).
pub fn ndcg_at_k(results: &[Vec<String>], relevant: &[Vec<String>], k: usize) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let mut ndcgs = Vec::with_capacity(results.len());
    for (retrieved, rel) in results.iter().zip(relevant.iter()) {
        let rel_set: HashSet<&String> = rel.iter().collect();
        let dcg: f64 = retrieved
            .iter()
            .take(k)
            .enumerate()
            .filter(|(_, id)| rel_set.contains(id))
            .map(|(i, _)| 1.0 / ((i as f64 + 2.0).log2()))
            .sum();
        let ideal_hits = rel_set.len().min(k);
        let idcg: f64 = (0..ideal_hits).map(|i| 1.0 / ((i as f64 + 2.0).log2())).sum();
        ndcgs.push(if idcg > 0.0 { dcg / idcg } else { 0.0 });
    }
    mean(&ndcgs)
}

/// Hit Rate@K: fraction of queries with at least one relevant document in
/// the top-k.
pub fn hit_rate_at_k(results: &[Vec<String>], relevant: &[Vec<String>], k: usize) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let hits = results
        .iter()
        .zip(relevant.iter())
        .filter(|(retrieved, rel)| {
            let rel_set: HashSet<&String> = rel.iter().collect();
            retrieved.iter().take(k).any(|id| rel_set.contains(id))
        })
        .count();
    hits as f64 / results.len() as f64
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn mrr_uses_first_relevant_rank() {
        let results = vec![ids(&["a", "b", "c"])];
        let relevant = vec![ids(&["b"])];
        assert!((mrr_at_k(&results, &relevant, 3) - 0.5).abs() < 1e-9);
        // outside the cutoff
        assert!(mrr_at_k(&results, &relevant, 1).abs() < 1e-9);
    }

    #[test]
    fn recall_counts_relevant_fraction_and_skips_empty() {
        let results = vec![ids(&["a", "b"]), ids(&["x"])];
        let relevant = vec![ids(&["b", "z"]), ids(&[])];
        // second query skipped entirely
        assert!((recall_at_k(&results, &relevant, 2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn precision_divides_by_k() {
        let results = vec![ids(&["a", "b", "c"])];
        let relevant = vec![ids(&["a", "c"])];
        assert!((precision_at_k(&results, &relevant, 3) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn ndcg_is_one_for_perfect_ranking() {
        let results = vec![ids(&["a", "b", "c"])];
        let relevant = vec![ids(&["a", "b"])];
        assert!((ndcg_at_k(&results, &relevant, 3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ndcg_penalizes_late_hits() {
        let results = vec![ids(&["x", "y", "a"])];
        let relevant = vec![ids(&["a"])];
        let expected = (1.0 / 4.0f64.log2()) / 1.0;
        assert!((ndcg_at_k(&results, &relevant, 3) - expected).abs() < 1e-9);
    }

    #[test]
    fn hit_rate_is_query_fraction() {
        let results = vec![ids(&["a"]), ids(&["x"])];
        let relevant = vec![ids(&["a"]), ids(&["b"])];
        assert!((hit_rate_at_k(&results, &relevant, 1) - 0.5).abs() < 1e-9);
    }
}
