//! `test_dataset.json` loading.
//!
//! Format: an array of `{ "query": ..., "relevant_doc_ids": [...], "doc_details": [...] }`.
//! Ids may be numbers or strings depending on how the ground truth was
//! generated; both normalize to strings.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TestQuery {
    pub query: String,
    #[serde(deserialize_with = "de_ids")]
    pub relevant_doc_ids: Vec<String>,
    /// Free-form annotations from the ground-truth generator; unused here.
    #[serde(default)]
    pub doc_details: Option<serde_json::Value>,
}

fn de_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    raw.into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "relevant_doc_ids entries must be strings or numbers, got {other}"
            ))),
        })
        .collect()
}

pub fn load_test_dataset(path: &Path) -> Result<Vec<TestQuery>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading test dataset {}", path.display()))?;
    let queries: Vec<TestQuery> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing test dataset {}", path.display()))?;
    Ok(queries)
}
