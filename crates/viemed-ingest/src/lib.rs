pub mod chunker;
pub mod corpus;
pub mod segment;

pub use chunker::{ChunkerConfig, ParentChildChunker, VIETNAMESE_STOPWORDS};
pub use corpus::{CorpusLoader, SourceDocument};
pub use segment::VietnameseSegmenter;
