//! Evaluation runner: retrieve once per query, score at every k.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use viemed_core::traits::SearchEngine;

use crate::dataset::TestQuery;
use crate::metrics;

pub const DEFAULT_K_VALUES: &[usize] = &[5, 10, 20];

pub struct RetrievalEvaluator<'a> {
    engine: &'a dyn SearchEngine,
}

impl<'a> RetrievalEvaluator<'a> {
    pub fn new(engine: &'a dyn SearchEngine) -> Self {
        Self { engine }
    }

    /// Run every query once at `max(k_values)` and compute all metrics per k.
    pub fn evaluate(
        &self,
        queries: &[TestQuery],
        k_values: &[usize],
    ) -> Result<BTreeMap<String, f64>> {
        tracing::info!(queries = queries.len(), "evaluating retrieval");
        let max_k = k_values.iter().copied().max().unwrap_or(10);

        let mut all_results = Vec::with_capacity(queries.len());
        let mut all_relevant = Vec::with_capacity(queries.len());
        for case in queries {
            let hits = self.engine.query(&case.query, max_k)?;
            all_results.push(hits.into_iter().map(|h| h.id).collect::<Vec<_>>());
            all_relevant.push(case.relevant_doc_ids.clone());
        }

        let mut out = BTreeMap::new();
        for &k in k_values {
            out.insert(
                format!("MRR@{k}"),
                metrics::mrr_at_k(&all_results, &all_relevant, k),
            );
            out.insert(
                format!("Recall@{k}"),
                metrics::recall_at_k(&all_results, &all_relevant, k),
            );
            out.insert(
                format!("Precision@{k}"),
                metrics::precision_at_k(&all_results, &all_relevant, k),
            );
            out.insert(
                format!("NDCG@{k}"),
                metrics::ndcg_at_k(&all_results, &all_relevant, k),
            );
            out.insert(
                format!("HitRate@{k}"),
                metrics::hit_rate_at_k(&all_results, &all_relevant, k),
            );
        }
        Ok(out)
    }
}

pub fn print_metrics_table(metrics: &BTreeMap<String, f64>) {
    println!("\n{}", "=".repeat(60));
    println!("RAG RETRIEVAL EVALUATION RESULTS");
    println!("{}", "=".repeat(60));
    println!("{:<20} {:<10}", "Metric", "Score");
    println!("{}", "-".repeat(60));
    for (name, score) in metrics {
        println!("{name:<20} {score:.4}");
    }
    println!("{}\n", "=".repeat(60));
}

/// Serialized alongside the metrics so a results file is self-describing.
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub test_file: String,
    pub num_queries: usize,
    pub total_relevant_docs: usize,
    pub avg_relevant_per_query: f64,
    pub k_values: Vec<usize>,
    pub metrics: BTreeMap<String, f64>,
}

impl EvaluationReport {
    pub fn new(
        test_file: &str,
        queries: &[TestQuery],
        k_values: &[usize],
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        let total_relevant: usize = queries.iter().map(|q| q.relevant_doc_ids.len()).sum();
        let avg = if queries.is_empty() {
            0.0
        } else {
            total_relevant as f64 / queries.len() as f64
        };
        Self {
            test_file: test_file.to_string(),
            num_queries: queries.len(),
            total_relevant_docs: total_relevant,
            avg_relevant_per_query: avg,
            k_values: k_values.to_vec(),
            metrics,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("results saved to {}", path.display());
        Ok(())
    }
}
