//! Weighted score fusion of the two retrieval legs.
//!
//! Raw BM25 scores are unbounded while cosine scores live in [-1, 1], so each
//! candidate list is min-max normalized to [0, 1] before the weighted sum.
//! Duplicates collapse first by chunk id, then by content prefix: children
//! cut from overlapping windows are near-identical without sharing an id.

use std::collections::{HashMap, HashSet};

use viemed_core::types::RetrievedDocument;

/// Length of the content prefix used as the duplicate key.
const DEDUP_PREFIX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub vector: f32,
    pub bm25: f32,
}

/// Min-max normalize scores in place; a uniform list maps to 1.0.
pub fn normalize_scores(docs: &mut [RetrievedDocument]) {
    if docs.is_empty() {
        return;
    }
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for d in docs.iter() {
        min = min.min(d.hit.score);
        max = max.max(d.hit.score);
    }
    let range = max - min;
    for d in docs.iter_mut() {
        d.hit.score = if range < 1e-9 {
            1.0
        } else {
            (d.hit.score - min) / range
        };
    }
}

/// Merge both legs into one ranked, deduplicated list of at most `k` docs.
pub fn fuse(
    mut vector_hits: Vec<RetrievedDocument>,
    mut text_hits: Vec<RetrievedDocument>,
    weights: FusionWeights,
    k: usize,
) -> Vec<RetrievedDocument> {
    normalize_scores(&mut vector_hits);
    normalize_scores(&mut text_hits);

    let mut by_id: HashMap<String, RetrievedDocument> = HashMap::new();
    for (mut doc, weight) in vector_hits
        .into_iter()
        .map(|d| (d, weights.vector))
        .chain(text_hits.into_iter().map(|d| (d, weights.bm25)))
    {
        let contribution = doc.hit.score * weight;
        doc.hit.score = contribution;
        by_id
            .entry(doc.id().to_string())
            .and_modify(|existing| existing.hit.score += contribution)
            .or_insert(doc);
    }

    let mut merged: Vec<RetrievedDocument> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        b.hit
            .score
            .partial_cmp(&a.hit.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.hit.id.cmp(&b.hit.id))
    });

    let mut seen_content: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(k);
    for doc in merged {
        if !seen_content.insert(content_key(&doc.content)) {
            continue;
        }
        out.push(doc);
        if out.len() == k {
            break;
        }
    }
    out
}

/// First 100 characters of the content, the original dedup key.
pub fn content_key(content: &str) -> String {
    content.chars().take(DEDUP_PREFIX_CHARS).collect()
}
