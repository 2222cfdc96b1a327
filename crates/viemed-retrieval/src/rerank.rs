//! Rerankers over retrieval candidates.
//!
//! The embedding reranker scores passages by cosine similarity against the
//! query using the same model that produced the index vectors; the lexical
//! reranker is the zero-model fallback (query-word overlap). Both normalize
//! to [0, 1], drop entries under the threshold and keep at most `top_n`.

use std::sync::Arc;

use viemed_core::traits::{Embedder, Reranker};

pub struct EmbeddingReranker {
    embedder: Arc<dyn Embedder>,
    top_n: usize,
}

impl EmbeddingReranker {
    pub fn new(embedder: Arc<dyn Embedder>, top_n: usize) -> Self {
        Self { embedder, top_n }
    }
}

impl Reranker for EmbeddingReranker {
    fn rerank(
        &self,
        query: &str,
        passages: &[String],
        threshold: f32,
    ) -> anyhow::Result<Vec<(usize, f32)>> {
        if passages.is_empty() {
            return Ok(vec![]);
        }
        let mut texts = Vec::with_capacity(passages.len() + 1);
        texts.push(query.to_string());
        texts.extend(passages.iter().cloned());
        let mut embeddings = self.embedder.embed_batch(&texts)?;
        let query_vec = embeddings.remove(0);

        let mut scored: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(i, passage_vec)| {
                // embeddings are unit-norm, dot product == cosine
                let cos: f32 = query_vec
                    .iter()
                    .zip(passage_vec.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                (i, (cos + 1.0) / 2.0)
            })
            .filter(|(_, score)| *score >= threshold)
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(self.top_n);
        tracing::debug!(kept = scored.len(), total = passages.len(), "reranked");
        Ok(scored)
    }
}

pub struct LexicalReranker {
    top_n: usize,
}

impl LexicalReranker {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }
}

impl Reranker for LexicalReranker {
    fn rerank(
        &self,
        query: &str,
        passages: &[String],
        threshold: f32,
    ) -> anyhow::Result<Vec<(usize, f32)>> {
        let query_lower = query.to_lowercase();
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() || passages.is_empty() {
            return Ok(vec![]);
        }
        let mut scored: Vec<(usize, f32)> = passages
            .iter()
            .enumerate()
            .map(|(i, passage)| {
                let passage_lower = passage.to_lowercase();
                let overlap = query_words
                    .iter()
                    .filter(|w| passage_lower.contains(**w))
                    .count();
                (i, overlap as f32 / query_words.len() as f32)
            })
            .filter(|(_, score)| *score >= threshold)
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(self.top_n);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_scores_are_overlap_fractions() {
        let reranker = LexicalReranker::new(5);
        let passages = vec![
            "sốt cao và đau đầu kéo dài".to_string(),
            "đau bụng âm ỉ".to_string(),
        ];
        let ranked = reranker
            .rerank("sốt cao đau đầu", &passages, 0.0)
            .expect("rerank");
        assert_eq!(ranked[0].0, 0);
        assert!((ranked[0].1 - 1.0).abs() < 1e-6);
        assert!((ranked[1].1 - 0.25).abs() < 1e-6, "only 'đau' matches");
    }

    #[test]
    fn lexical_threshold_filters() {
        let reranker = LexicalReranker::new(5);
        let passages = vec![
            "sốt cao và đau đầu".to_string(),
            "hoàn toàn không liên quan".to_string(),
        ];
        let ranked = reranker
            .rerank("sốt cao đau đầu", &passages, 0.3)
            .expect("rerank");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, 0);
    }

    #[test]
    fn lexical_top_n_truncates() {
        let reranker = LexicalReranker::new(1);
        let passages = vec![
            "sốt cao".to_string(),
            "sốt cao kéo dài".to_string(),
            "sốt".to_string(),
        ];
        let ranked = reranker.rerank("sốt cao", &passages, 0.0).expect("rerank");
        assert_eq!(ranked.len(), 1);
    }
}
