use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, RegexTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

use viemed_ingest::VIETNAMESE_STOPWORDS;

pub const TOKENIZER_NAME: &str = "vi_text";

/// Child chunk schema: stored payload plus one indexed `text` field carrying
/// the segmented form. `content` keeps the original for display/generation.
pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let _id_field = schema_builder.add_text_field("id", STRING | STORED);
    let _parent_id_field = schema_builder.add_text_field("parent_id", STRING | STORED);
    let _doc_path_field = schema_builder.add_text_field("doc_path", STRING | STORED);
    let _header_field = schema_builder.add_text_field("header", STRING | STORED);
    let _content_field = schema_builder.add_text_field("content", STORED);
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER_NAME)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
    let _text_field = schema_builder.add_text_field("text", text_options);
    schema_builder.build()
}

/// Word tokens keep underscores so segmented compounds ("sốt_xuất_huyết")
/// survive as single BM25 terms.
pub fn register_tokenizer(index: &Index) -> anyhow::Result<()> {
    let tokenizer = TextAnalyzer::builder(RegexTokenizer::new(r"[\p{L}\p{N}_]+")?)
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            VIETNAMESE_STOPWORDS.iter().map(|s| (*s).to_string()),
        ))
        .build();
    index.tokenizers().register(TOKENIZER_NAME, tokenizer);
    Ok(())
}
