use std::{env, path::PathBuf, sync::Arc};

use viemed_core::config::Config;
use viemed_core::traits::{Embedder, Reranker};
use viemed_embed::get_default_embedder;
use viemed_retrieval::{EmbeddingReranker, HybridSearchEngine, RagRetriever, SearchMode};
use viemed_text::TantivyChildIndexer;
use viemed_vector::{LanceChildIndexer, LanceParentStore};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut mode = SearchMode::Hybrid;
    let mut use_reranker = true;
    let mut query = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                let value = args.get(i + 1).map(|v| v.parse::<SearchMode>());
                match value {
                    Some(Ok(m)) => {
                        mode = m;
                        i += 1;
                    }
                    _ => {
                        eprintln!("Error: --mode requires hybrid|vector|bm25");
                        std::process::exit(1);
                    }
                }
            }
            "--no-rerank" => use_reranker = false,
            other if !other.starts_with('-') => query = Some(other.to_string()),
            other => {
                eprintln!("Unknown flag: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    let Some(query) = query else {
        eprintln!("Usage: viemed-search [--mode hybrid|vector|bm25] [--no-rerank] \"<query>\"");
        std::process::exit(1);
    };

    let params = config.retrieval();
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
    let parents = rt.block_on(async { LanceParentStore::connect(&lancedb_dir, "parents").await })?;
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder()?);

    let reranker: Option<Box<dyn Reranker>> = if use_reranker {
        Some(Box::new(EmbeddingReranker::new(
            embedder.clone(),
            params.rerank_top_n,
        )))
    } else {
        None
    };
    let top_k = params.top_k;
    let engine = HybridSearchEngine::new(text, vector, embedder, params);
    let retriever = RagRetriever::new(engine, reranker, Box::new(parents));

    let results = retriever.retrieve_documents(&query, top_k, mode)?;
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), query);
    for (i, result) in results.iter().enumerate() {
        let snippet: String = result.content.chars().take(150).collect();
        println!(
            "\n  {}. score={:.4}  id={}  parent={}  [{:?}]",
            i + 1,
            result.hit.score,
            result.hit.id,
            result.parent_id,
            result.hit.source,
        );
        println!("     📝 {snippet}");
    }
    Ok(())
}
