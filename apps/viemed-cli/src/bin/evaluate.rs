use std::{env, path::PathBuf, sync::Arc};

use viemed_core::config::Config;
use viemed_core::traits::{Embedder, SearchEngine};
use viemed_embed::get_default_embedder;
use viemed_eval::evaluator::{print_metrics_table, DEFAULT_K_VALUES};
use viemed_eval::{load_test_dataset, EvaluationReport, RetrievalEvaluator};
use viemed_retrieval::HybridSearchEngine;
use viemed_text::TantivyChildIndexer;
use viemed_vector::LanceChildIndexer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut test_file = PathBuf::from("evaluation/test_dataset.json");
    let mut k_values: Vec<usize> = DEFAULT_K_VALUES.to_vec();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--test-file" => {
                match args.get(i + 1) {
                    Some(path) => {
                        test_file = PathBuf::from(path);
                        i += 1;
                    }
                    None => {
                        eprintln!("Error: --test-file requires a path");
                        std::process::exit(1);
                    }
                }
            }
            "--k-values" => {
                let mut values = Vec::new();
                while let Some(v) = args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    values.push(v);
                    i += 1;
                }
                if values.is_empty() {
                    eprintln!("Error: --k-values requires at least one number");
                    std::process::exit(1);
                }
                k_values = values;
            }
            other => {
                eprintln!("Unknown flag: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let queries = load_test_dataset(&test_file)?;
    println!("\n{}", "=".repeat(60));
    println!("TEST DATASET INFO");
    println!("{}", "=".repeat(60));
    println!("Total queries: {}", queries.len());
    let total_relevant: usize = queries.iter().map(|q| q.relevant_doc_ids.len()).sum();
    println!("Total relevant docs: {total_relevant}");
    if !queries.is_empty() {
        println!(
            "Avg relevant per query: {:.2}",
            total_relevant as f64 / queries.len() as f64
        );
    }
    println!("{}\n", "=".repeat(60));

    let tantivy_dir: String = config
        .get("data.tantivy_index_dir")
        .unwrap_or_else(|_| "data/indexes/tantivy".to_string());
    let lancedb_dir = PathBuf::from(
        config
            .get::<String>("data.lancedb_dir")
            .unwrap_or_else(|_| "data/indexes/lancedb".to_string()),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let text = TantivyChildIndexer::open(&PathBuf::from(&tantivy_dir))?;
    let vector = rt.block_on(async { LanceChildIndexer::connect(&lancedb_dir, "children").await })?;
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder()?);
    let engine = HybridSearchEngine::new(text, vector, embedder, config.retrieval());

    let evaluator = RetrievalEvaluator::new(&engine as &dyn SearchEngine);
    let metrics = evaluator.evaluate(&queries, &k_values)?;
    print_metrics_table(&metrics);

    let stem = test_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "test_dataset".to_string());
    let report = EvaluationReport::new(
        &test_file.to_string_lossy(),
        &queries,
        &k_values,
        metrics,
    );
    let results_path = PathBuf::from(format!("evaluation/results/evaluation_results_{stem}.json"));
    report.save(&results_path)?;
    println!("✅ Results saved to {}", results_path.display());
    Ok(())
}
