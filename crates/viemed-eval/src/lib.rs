//! Retrieval evaluation: ground-truth datasets, IR metrics and the runner.

pub mod dataset;
pub mod evaluator;
pub mod metrics;

pub use dataset::{load_test_dataset, TestQuery};
pub use evaluator::{EvaluationReport, RetrievalEvaluator};
