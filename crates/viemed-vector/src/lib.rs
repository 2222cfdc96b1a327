//! LanceDB storage: child-chunk vectors for dense retrieval and the parent
//! table used to expand retrieved children into generation context.

pub mod parents;
pub mod schema;
pub mod search;
pub mod writer;

pub use parents::{LanceParentStore, MemoryParentStore};
pub use writer::LanceChildIndexer;
