use crate::types::{ChildChunk, ParentChunk, RetrievedDocument, SearchHit};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

pub trait TextIndexer: Send + Sync {
    fn index(&self, chunks: &[ChildChunk]) -> anyhow::Result<()>;
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<RetrievedDocument>>;
}

pub trait VectorIndexer: Send + Sync {
    fn index(&self, chunks: &[ChildChunk], embeddings: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<RetrievedDocument>>;
}

/// Reorders retrieval candidates by relevance to the query.
///
/// Returns `(candidate_index, score)` pairs sorted descending, with scores
/// normalized to `[0, 1]` and entries below `threshold` dropped.
pub trait Reranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        passages: &[String],
        threshold: f32,
    ) -> anyhow::Result<Vec<(usize, f32)>>;
}

/// Keyed storage for parent chunks, looked up when expanding retrieved
/// children into generation context.
pub trait ParentStore: Send + Sync {
    fn put(&self, parents: &[ParentChunk]) -> anyhow::Result<()>;
    fn get(&self, id: &str) -> anyhow::Result<Option<ParentChunk>>;
}

pub trait SearchEngine: Send + Sync {
    fn query(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}
