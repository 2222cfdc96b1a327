use std::sync::Arc;

use viemed_core::config::RetrievalParams;
use viemed_core::traits::{ParentStore, TextIndexer, VectorIndexer};
use viemed_core::types::{ChildChunk, ParentChunk, RetrievedDocument, SearchHit, SourceKind};
use viemed_embed::FakeEmbedder;
use viemed_retrieval::{HybridSearchEngine, LexicalReranker, RagRetriever, SearchMode};
use viemed_vector::MemoryParentStore;

struct StubText(Vec<RetrievedDocument>);

impl TextIndexer for StubText {
    fn index(&self, _chunks: &[ChildChunk]) -> anyhow::Result<()> {
        Ok(())
    }

    fn search(&self, _query: &str, k: usize) -> anyhow::Result<Vec<RetrievedDocument>> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

struct StubVector(Vec<RetrievedDocument>);

impl VectorIndexer for StubVector {
    fn index(&self, _chunks: &[ChildChunk], _embeddings: &[Vec<f32>]) -> anyhow::Result<()> {
        Ok(())
    }

    fn search_vec(&self, _query_vec: &[f32], k: usize) -> anyhow::Result<Vec<RetrievedDocument>> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

fn doc(id: &str, parent_id: &str, score: f32, source: SourceKind, content: &str) -> RetrievedDocument {
    RetrievedDocument {
        hit: SearchHit {
            id: id.to_string(),
            score,
            source,
        },
        parent_id: parent_id.to_string(),
        content: content.to_string(),
    }
}

fn parent(id: &str, header: &str, content: &str) -> ParentChunk {
    ParentChunk {
        id: id.to_string(),
        doc_id: "doc".to_string(),
        doc_path: "corpus/doc.txt".to_string(),
        header: header.to_string(),
        section_depth: 2,
        content: content.to_string(),
        char_count: content.chars().count(),
    }
}

fn build_retriever(
    vector_hits: Vec<RetrievedDocument>,
    text_hits: Vec<RetrievedDocument>,
    rerank: bool,
) -> RagRetriever<StubText, StubVector> {
    let engine = HybridSearchEngine::new(
        StubText(text_hits),
        StubVector(vector_hits),
        Arc::new(FakeEmbedder::new(1024)),
        RetrievalParams::default(),
    );
    let parents = MemoryParentStore::new();
    parents
        .put(&[
            parent("p0", "Triệu chứng", "Sốt cao kéo dài,\nmệt mỏi và *đau đầu* dữ dội."),
            parent("p1", "Điều trị", "Uống đủ nước và hạ sốt theo chỉ dẫn."),
        ])
        .expect("seed parents");
    let reranker: Option<Box<dyn viemed_core::traits::Reranker>> = if rerank {
        Some(Box::new(LexicalReranker::new(5)))
    } else {
        None
    };
    RagRetriever::new(engine, reranker, Box::new(parents))
}

#[test]
fn retrieve_context_cleans_passages() {
    let retriever = build_retriever(
        vec![doc(
            "c0",
            "p0",
            0.9,
            SourceKind::Vector,
            "[Triệu chứng] Sốt cao kéo dài\nvà *mệt mỏi*.",
        )],
        vec![],
        false,
    );
    let context = retriever
        .retrieve_context("sốt cao", 5, SearchMode::Hybrid)
        .expect("context");
    assert_eq!(context.len(), 1);
    assert!(!context[0].contains('\n'));
    assert!(!context[0].contains('*'));
    assert!(context[0].contains("Sốt cao kéo dài"));
}

#[test]
fn parent_expansion_dedups_and_preserves_order() {
    let retriever = build_retriever(
        vec![
            doc("c0", "p0", 0.9, SourceKind::Vector, "[Triệu chứng] sốt cao"),
            doc("c1", "p0", 0.7, SourceKind::Vector, "[Triệu chứng] mệt mỏi"),
            doc("c2", "p1", 0.5, SourceKind::Vector, "[Điều trị] uống nước"),
        ],
        vec![],
        false,
    );
    let context = retriever
        .retrieve_parent_context("sốt cao mệt mỏi", 5, SearchMode::Hybrid)
        .expect("context");
    // two children of p0 collapse into one parent passage
    assert_eq!(context.len(), 2);
    assert!(context[0].contains("Triệu chứng"));
    assert!(context[1].contains("Điều trị"));
}

#[test]
fn missing_parent_falls_back_to_child_content() {
    let retriever = build_retriever(
        vec![doc(
            "c9",
            "p_unknown",
            0.9,
            SourceKind::Vector,
            "[Khác] nội dung mồ côi",
        )],
        vec![],
        false,
    );
    let context = retriever
        .retrieve_parent_context("nội dung", 5, SearchMode::Hybrid)
        .expect("context");
    assert_eq!(context.len(), 1);
    assert!(context[0].contains("mồ côi"));
}

#[test]
fn reranker_filters_and_reorders() {
    let retriever = build_retriever(
        vec![
            doc("c0", "p0", 0.9, SourceKind::Vector, "hoàn toàn lạc đề"),
            doc("c1", "p1", 0.5, SourceKind::Vector, "sốt cao và đau đầu dữ dội"),
        ],
        vec![],
        true,
    );
    let docs = retriever
        .retrieve_documents("sốt cao đau đầu", 5, SearchMode::Hybrid)
        .expect("docs");
    // lexical reranker (threshold 0.3) drops the off-topic passage
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].hit.id, "c1");
}

#[test]
fn bm25_mode_uses_only_the_text_leg() {
    let retriever = build_retriever(
        vec![doc("v0", "p0", 0.9, SourceKind::Vector, "vector only")],
        vec![doc("t0", "p1", 3.0, SourceKind::Text, "bm25 only")],
        false,
    );
    let docs = retriever
        .retrieve_documents("q", 5, SearchMode::Bm25)
        .expect("docs");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].hit.id, "t0");
}
