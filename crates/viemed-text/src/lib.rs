//! viemed-text
//!
//! Tantivy-based BM25 indexing and search over child chunks. Indexed text is
//! the segmenter-normalized form; the stored payload keeps the original.

pub mod index;
pub mod tantivy_utils;

pub use index::TantivyChildIndexer;
