use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const EMBEDDING_DIM: i32 = 1024;

pub const CHILDREN_TABLE: &str = "children";
pub const PARENTS_TABLE: &str = "parents";

pub fn build_children_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("parent_id", DataType::Utf8, false),
        Field::new("doc_id", DataType::Utf8, false),
        Field::new("doc_path", DataType::Utf8, false),
        Field::new("header", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("total_children", DataType::Int32, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM,
            ),
            true,
        ),
    ]))
}

pub fn build_parents_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("doc_id", DataType::Utf8, false),
        Field::new("doc_path", DataType::Utf8, false),
        Field::new("header", DataType::Utf8, false),
        Field::new("section_depth", DataType::Int32, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("char_count", DataType::Int32, false),
    ]))
}
