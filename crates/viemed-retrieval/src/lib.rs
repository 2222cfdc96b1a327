//! Hybrid retrieval: score fusion over the BM25 and vector legs, reranking,
//! parent expansion and the RAG service facade.

pub mod engine;
pub mod fusion;
pub mod rerank;
pub mod service;

pub use engine::{HybridSearchEngine, SearchMode};
pub use rerank::{EmbeddingReranker, LexicalReranker};
pub use service::{GeneratedAnswer, RagRetriever, RagService};
