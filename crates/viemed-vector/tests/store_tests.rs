use viemed_core::traits::{Embedder, ParentStore};
use viemed_core::types::{ChildChunk, ParentChunk};
use viemed_embed::FakeEmbedder;
use viemed_vector::{LanceChildIndexer, LanceParentStore, MemoryParentStore};

fn parent(id: &str, content: &str) -> ParentChunk {
    ParentChunk {
        id: id.to_string(),
        doc_id: "doc".to_string(),
        doc_path: "corpus/doc.txt".to_string(),
        header: "Triệu chứng".to_string(),
        section_depth: 2,
        content: content.to_string(),
        char_count: content.chars().count(),
    }
}

fn child(id: &str, parent_id: &str, content: &str) -> ChildChunk {
    ChildChunk {
        id: id.to_string(),
        parent_id: parent_id.to_string(),
        doc_id: "doc".to_string(),
        doc_path: "corpus/doc.txt".to_string(),
        header: "Triệu chứng".to_string(),
        content: content.to_string(),
        chunk_index: 0,
        total_children: 1,
        char_count: content.chars().count(),
        has_complete_sentences: true,
        keywords: vec![],
    }
}

#[tokio::test]
async fn children_index_and_vector_search() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let indexer = LanceChildIndexer::connect(tmp.path(), "children")
        .await
        .expect("connect");

    let chunks = vec![
        child("p0_child_0", "p0", "[Triệu chứng] sốt cao kéo dài nhiều ngày"),
        child("p1_child_0", "p1", "[Điều trị] uống thuốc theo chỉ định bác sĩ"),
    ];
    let embedder = FakeEmbedder::new(1024);
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).expect("embed");
    indexer
        .index_async(&chunks, &embeddings)
        .await
        .expect("index");

    let query_vec = embedder
        .embed_batch(&["sốt cao kéo dài nhiều ngày".to_string()])
        .expect("embed")
        .remove(0);
    let hits = indexer.search_async(&query_vec, 2).await.expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].hit.id, "p0_child_0");
    assert_eq!(hits[0].parent_id, "p0");
    assert!(hits[0].hit.score >= hits[1].hit.score);
}

#[tokio::test]
async fn parent_store_upsert_and_get() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = LanceParentStore::connect(tmp.path(), "parents")
        .await
        .expect("connect");

    store
        .put_async(&[parent("doc_parent_0", "Nội dung ban đầu.")])
        .await
        .expect("put");
    store
        .put_async(&[
            parent("doc_parent_0", "Nội dung đã cập nhật."),
            parent("doc_parent_1", "Phần thứ hai."),
        ])
        .await
        .expect("upsert");

    let got = store.get_async("doc_parent_0").await.expect("get");
    assert_eq!(
        got.map(|p| p.content),
        Some("Nội dung đã cập nhật.".to_string())
    );
    let missing = store.get_async("doc_parent_9").await.expect("get");
    assert!(missing.is_none());
}

#[test]
fn memory_parent_store_round_trip() {
    let store = MemoryParentStore::new();
    store
        .put(&[parent("x_parent_0", "Một đoạn nội dung.")])
        .expect("put");
    let got = store.get("x_parent_0").expect("get");
    assert_eq!(got.map(|p| p.header), Some("Triệu chứng".to_string()));
    assert!(store.get("nope").expect("get").is_none());
}
