use viemed_ingest::{ChunkerConfig, CorpusLoader, ParentChildChunker};

const SAMPLE: &str = "\
# Bệnh Alzheimer

## Định nghĩa là gì?
Alzheimer là bệnh thoái hóa thần kinh tiến triển, ảnh hưởng đến trí nhớ.

## Triệu chứng
Các triệu chứng bao gồm quên tên người quen, lạc đường.

1. Giai đoạn sớm
Bệnh nhân thường quên tên người quen.

2. Giai đoạn muộn
Mất khả năng giao tiếp hoàn toàn.
";

#[test]
fn splits_on_headers_into_parents() {
    let chunker = ParentChildChunker::default();
    let (parents, children) = chunker
        .chunk_document(SAMPLE, "alzheimer", "corpus/alzheimer.txt")
        .expect("chunk");

    let headers: Vec<&str> = parents.iter().map(|p| p.header.as_str()).collect();
    assert_eq!(
        headers,
        vec![
            "Định nghĩa là gì?",
            "Triệu chứng",
            "Giai đoạn sớm",
            "Giai đoạn muộn"
        ]
    );
    // Small sections become exactly one child each
    assert_eq!(children.len(), parents.len());
}

#[test]
fn children_carry_injected_headers_and_parent_ids() {
    let chunker = ParentChildChunker::default();
    let (parents, children) = chunker
        .chunk_document(SAMPLE, "alzheimer", "corpus/alzheimer.txt")
        .expect("chunk");

    let parent_ids: Vec<&str> = parents.iter().map(|p| p.id.as_str()).collect();
    for child in &children {
        assert!(child.content.starts_with(&format!("[{}] ", child.header)));
        assert!(parent_ids.contains(&child.parent_id.as_str()));
        assert!(child.id.starts_with(&child.parent_id));
    }
    assert_eq!(parents[0].id, "alzheimer_parent_0");
    assert_eq!(children[0].id, "alzheimer_parent_0_child_0");
}

#[test]
fn long_sections_split_with_contiguous_indices() {
    let sentence = "Trieu chung thuong gap la sot cao keo dai va met moi toan than.\n";
    let body = sentence.repeat(40); // ~2.6k chars, no headers
    let chunker = ParentChildChunker::default();
    let (parents, children) = chunker
        .chunk_document(&body, "long", "corpus/long.txt")
        .expect("chunk");

    // 1500-char parent cap forces multiple parents
    assert!(parents.len() >= 2, "expected parent split, got {}", parents.len());
    for parent in &parents {
        // the cap is checked after each appended line
        assert!(parent.char_count < 1500 + sentence.len());
        assert_eq!(parent.header, "Introduction");
    }

    // each parent larger than 500 chars yields several children
    assert!(children.len() > parents.len());
    for group in parents.iter().map(|p| {
        children
            .iter()
            .filter(|c| c.parent_id == p.id)
            .collect::<Vec<_>>()
    }) {
        for (idx, child) in group.iter().enumerate() {
            assert_eq!(child.chunk_index, idx);
            assert_eq!(child.total_children, group.len());
        }
    }
}

#[test]
fn non_terminal_children_respect_minimum_size() {
    let config = ChunkerConfig::default();
    let min = config.child_min_size;
    let chunker = ParentChildChunker::new(config);
    let sentence = "Benh nhan can duoc theo doi huyet ap moi ngay va tai kham dung hen. ";
    let body = sentence.repeat(12); // one parent, multiple children
    let (_, children) = chunker
        .chunk_document(&body, "bp", "corpus/bp.txt")
        .expect("chunk");

    assert!(children.len() >= 2);
    for child in &children[..children.len() - 1] {
        assert!(
            child.char_count >= min,
            "non-terminal child below minimum: {}",
            child.char_count
        );
    }
}

#[test]
fn keywords_skip_stopwords() {
    let chunker = ParentChildChunker::default();
    let keywords = chunker.extract_keywords(
        "[Triệu chứng] Sốt cao và đau đầu là những triệu chứng của bệnh sốt xuất huyết",
        5,
    );
    assert!(keywords.contains(&"sốt".to_string()));
    assert!(!keywords.contains(&"và".to_string()));
    assert!(!keywords.contains(&"của".to_string()));
    assert!(keywords.len() <= 5);
}

#[test]
fn loader_reads_corpus_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::write(tmp.path().join("a.txt"), "Nội dung tài liệu một.").expect("write");
    std::fs::write(
        tmp.path().join("b.html"),
        "<p>Nội dung tài liệu hai.</p>",
    )
    .expect("write");
    std::fs::write(tmp.path().join("c.bin"), [0u8, 1, 2]).expect("write");

    let loader = CorpusLoader::new();
    let docs = loader.load_dir(tmp.path()).expect("load");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].doc_id, "a");
    assert!(docs[1].content.contains("tài liệu hai"));
}
