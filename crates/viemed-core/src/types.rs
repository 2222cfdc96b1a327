//! Domain types shared by the ingest, text, vector and retrieval engines.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// A large section-level chunk used as generation context.
///
/// Parents are cut at header boundaries (or at `parent_max_size`) and are
/// never embedded directly; the small children derived from them are what
/// both search engines index. `id` follows `<doc_id>_parent_<n>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub doc_path: String,
    pub header: String,
    pub section_depth: usize,
    pub content: String,
    pub char_count: usize,
}

/// A small retrieval-sized chunk derived from one parent.
///
/// `content` carries the injected `[header] ` prefix so a child stays
/// meaningful out of context. `id` follows `<parent_id>_child_<n>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildChunk {
    pub id: ChunkId,
    pub parent_id: ChunkId,
    pub doc_id: String,
    pub doc_path: String,
    pub header: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_children: usize,
    pub char_count: usize,
    pub has_complete_sentences: bool,
    pub keywords: Vec<String>,
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by all engines.
///
/// `id` matches `ChildChunk::id`. `score` is engine-specific but higher is
/// always better. `source` labels the origin engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ChunkId,
    pub score: f32,
    pub source: SourceKind,
}

/// A hit joined with its stored payload, as needed by fusion and reranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub hit: SearchHit,
    pub parent_id: ChunkId,
    pub content: String,
}

impl RetrievedDocument {
    pub fn id(&self) -> &str {
        &self.hit.id
    }

    pub fn score(&self) -> f32 {
        self.hit.score
    }
}
