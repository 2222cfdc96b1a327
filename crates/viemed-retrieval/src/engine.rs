use anyhow::Result;
use std::str::FromStr;
use std::sync::Arc;

use viemed_core::config::RetrievalParams;
use viemed_core::traits::{Embedder, SearchEngine, TextIndexer, VectorIndexer};
use viemed_core::types::{ChildChunk, RetrievedDocument, SearchHit};

use crate::fusion::{fuse, FusionWeights};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Hybrid,
    Vector,
    Bm25,
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "vector" => Ok(Self::Vector),
            "bm25" => Ok(Self::Bm25),
            other => Err(anyhow::anyhow!("unknown search mode: {other}")),
        }
    }
}

/// The hybrid engine over both index legs.
///
/// `index` embeds children once and writes both indexes from the same batch;
/// `search_hybrid` fans out to both legs with the configured candidate counts
/// and fuses the results.
pub struct HybridSearchEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    text: TI,
    vector: VI,
    embedder: Arc<dyn Embedder>,
    params: RetrievalParams,
}

impl<TI, VI> HybridSearchEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    pub fn new(text: TI, vector: VI, embedder: Arc<dyn Embedder>, params: RetrievalParams) -> Self {
        Self {
            text,
            vector,
            embedder,
            params,
        }
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    pub fn index(&self, chunks: &[ChildChunk]) -> Result<()> {
        let batch_texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&batch_texts)?;
        for e in &embeddings {
            anyhow::ensure!(e.len() == self.embedder.dim(), "embedding dim mismatch");
        }
        self.vector.index(chunks, &embeddings)?;
        self.text.index(chunks)
    }

    pub fn search_vector(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        let q_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .remove(0);
        self.vector.search_vec(&q_vec, k)
    }

    pub fn search_bm25(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        self.text.search(query, k)
    }

    pub fn search_hybrid(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        let vector_hits = self.search_vector(query, self.params.k1)?;
        let text_hits = self.search_bm25(query, self.params.k2)?;
        tracing::debug!(
            vector = vector_hits.len(),
            bm25 = text_hits.len(),
            "hybrid candidates"
        );
        Ok(fuse(
            vector_hits,
            text_hits,
            FusionWeights {
                vector: self.params.vector_weight,
                bm25: self.params.bm25_weight,
            },
            k,
        ))
    }

    pub fn search(&self, query: &str, k: usize, mode: SearchMode) -> Result<Vec<RetrievedDocument>> {
        match mode {
            SearchMode::Hybrid => self.search_hybrid(query, k),
            SearchMode::Vector => self.search_vector(query, k),
            SearchMode::Bm25 => self.search_bm25(query, k),
        }
    }
}

impl<TI, VI> SearchEngine for HybridSearchEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    fn query(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        Ok(self
            .search_hybrid(query, k)?
            .into_iter()
            .map(|d| d.hit)
            .collect())
    }
}
