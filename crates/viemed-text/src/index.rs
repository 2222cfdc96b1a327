use anyhow::Result;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{doc, Index, TantivyDocument};

use viemed_core::traits::TextIndexer;
use viemed_core::types::{ChildChunk, RetrievedDocument, SearchHit, SourceKind};
use viemed_ingest::VietnameseSegmenter;

use crate::tantivy_utils::{build_schema, register_tokenizer};

pub struct TantivyChildIndexer {
    index: Index,
    segmenter: VietnameseSegmenter,
    id_field: tantivy::schema::Field,
    parent_id_field: tantivy::schema::Field,
    path_field: tantivy::schema::Field,
    header_field: tantivy::schema::Field,
    content_field: tantivy::schema::Field,
    text_field: tantivy::schema::Field,
}

impl TantivyChildIndexer {
    /// Create a fresh index, wiping any previous one at `index_dir`.
    pub fn create(index_dir: &Path) -> Result<Self> {
        let schema = build_schema();
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir)?;
        }
        std::fs::create_dir_all(index_dir)?;
        let index = Index::create_in_dir(index_dir, schema)?;
        Self::from_index(index)
    }

    /// Open an existing index for searching.
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)?;
        Self::from_index(index)
    }

    fn from_index(index: Index) -> Result<Self> {
        register_tokenizer(&index)?;
        let schema = index.schema();
        let id_field = schema.get_field("id")?;
        let parent_id_field = schema.get_field("parent_id")?;
        let path_field = schema.get_field("doc_path")?;
        let header_field = schema.get_field("header")?;
        let content_field = schema.get_field("content")?;
        let text_field = schema.get_field("text")?;
        Ok(Self {
            index,
            segmenter: VietnameseSegmenter::new(),
            id_field,
            parent_id_field,
            path_field,
            header_field,
            content_field,
            text_field,
        })
    }

    fn stored_str(doc: &TantivyDocument, field: tantivy::schema::Field) -> String {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }
}

impl TextIndexer for TantivyChildIndexer {
    fn index(&self, chunks: &[ChildChunk]) -> Result<()> {
        let mut index_writer = self.index.writer(50_000_000)?;
        for c in chunks {
            let segmented = self.segmenter.segment(&c.content);
            let doc = doc!(
                self.id_field => c.id.clone(),
                self.parent_id_field => c.parent_id.clone(),
                self.path_field => c.doc_path.clone(),
                self.header_field => c.header.clone(),
                self.content_field => c.content.clone(),
                self.text_field => segmented,
            );
            index_writer.add_document(doc)?;
        }
        index_writer.commit()?;
        Ok(())
    }

    fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
        // lenient: user queries carry Vietnamese punctuation tantivy syntax chokes on
        let (q, _errors) = qp.parse_query_lenient(&self.segmenter.segment(query));
        let top_docs = searcher.search(&q, &TopDocs::with_limit(k))?;
        let mut hits = Vec::new();
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            hits.push(RetrievedDocument {
                hit: SearchHit {
                    id: Self::stored_str(&doc, self.id_field),
                    score,
                    source: SourceKind::Text,
                },
                parent_id: Self::stored_str(&doc, self.parent_id_field),
                content: Self::stored_str(&doc, self.content_field),
            });
        }
        Ok(hits)
    }
}
