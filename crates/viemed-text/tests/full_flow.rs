use viemed_core::traits::TextIndexer;
use viemed_core::types::ChildChunk;
use viemed_text::TantivyChildIndexer;

fn child(id: &str, parent: &str, header: &str, content: &str) -> ChildChunk {
    ChildChunk {
        id: id.to_string(),
        parent_id: parent.to_string(),
        doc_id: "doc".to_string(),
        doc_path: "corpus/doc.txt".to_string(),
        header: header.to_string(),
        content: content.to_string(),
        chunk_index: 0,
        total_children: 1,
        char_count: content.chars().count(),
        has_complete_sentences: true,
        keywords: vec![],
    }
}

#[test]
fn index_and_search_round_trip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let indexer = TantivyChildIndexer::create(tmp.path()).expect("create");

    let chunks = vec![
        child(
            "a_parent_0_child_0",
            "a_parent_0",
            "Triệu chứng",
            "[Triệu chứng] Sốt xuất huyết gây sốt cao và xuất huyết dưới da.",
        ),
        child(
            "b_parent_0_child_0",
            "b_parent_0",
            "Điều trị",
            "[Điều trị] Viêm phổi cần điều trị bằng kháng sinh theo chỉ định.",
        ),
    ];
    indexer.index(&chunks).expect("index");

    let hits = indexer.search("sốt xuất huyết", 10).expect("search");
    assert!(!hits.is_empty());
    assert_eq!(hits[0].hit.id, "a_parent_0_child_0");
    assert_eq!(hits[0].parent_id, "a_parent_0");
    assert!(hits[0].content.contains("Sốt xuất huyết"));
    if hits.len() >= 2 {
        assert!(hits[0].hit.score >= hits[1].hit.score);
    }
}

#[test]
fn reopened_index_is_searchable() {
    let tmp = tempfile::tempdir().expect("tempdir");
    {
        let indexer = TantivyChildIndexer::create(tmp.path()).expect("create");
        indexer
            .index(&[child(
                "c_parent_0_child_0",
                "c_parent_0",
                "Phòng ngừa",
                "[Phòng ngừa] Tiêm vắc xin giúp phòng ngừa bệnh cúm mùa.",
            )])
            .expect("index");
    }
    let reopened = TantivyChildIndexer::open(tmp.path()).expect("open");
    let hits = reopened.search("vắc xin cúm", 5).expect("search");
    assert_eq!(hits.len(), 1);
}

#[test]
fn punctuated_queries_do_not_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let indexer = TantivyChildIndexer::create(tmp.path()).expect("create");
    indexer
        .index(&[child(
            "d_parent_0_child_0",
            "d_parent_0",
            "Tổng quan",
            "[Tổng quan] Đau đầu kéo dài có thể là dấu hiệu bệnh lý.",
        )])
        .expect("index");

    // parse_query_lenient must absorb query-syntax characters
    let hits = indexer
        .search("đau đầu kéo dài: nguyên nhân (và cách chữa)?", 5)
        .expect("search");
    assert!(!hits.is_empty());
}
