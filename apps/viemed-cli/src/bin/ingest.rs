use std::{env, fs, path::PathBuf, sync::Arc};

use viemed_core::config::Config;
use viemed_core::traits::{Embedder, ParentStore};
use viemed_embed::get_default_embedder;
use viemed_ingest::{CorpusLoader, ParentChildChunker};
use viemed_retrieval::HybridSearchEngine;
use viemed_text::TantivyChildIndexer;
use viemed_vector::{LanceChildIndexer, LanceParentStore};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut limit = None;
    let mut data_dir = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                let value = args.get(i + 1).and_then(|v| v.parse::<usize>().ok());
                match value {
                    Some(n) => {
                        limit = Some(n);
                        i += 1;
                    }
                    None => {
                        eprintln!("Error: --limit requires a number");
                        std::process::exit(1);
                    }
                }
            }
            other if !other.starts_with('-') => data_dir = Some(PathBuf::from(other)),
            other => {
                eprintln!("Unknown flag: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    let data_dir = data_dir.unwrap_or_else(|| {
        let dir: String = config
            .get("data.corpus_dir")
            .unwrap_or_else(|_| "data/corpus".to_string());
        PathBuf::from(dir)
    });

    println!("VieMed Ingest\n=============");
    println!("Corpus directory: {}", data_dir.display());

    let loader = CorpusLoader::new();
    let docs = match limit {
        Some(n) => loader.load_dir_limited(&data_dir, n)?,
        None => loader.load_dir(&data_dir)?,
    };
    if docs.is_empty() {
        return Ok(());
    }

    let chunker = ParentChildChunker::default();
    let mut all_parents = Vec::new();
    let mut all_children = Vec::new();
    for (idx, doc) in docs.iter().enumerate() {
        println!(
            "Processing file {}/{}: {}",
            idx + 1,
            docs.len(),
            doc.doc_path
        );
        let (parents, children) = chunker.chunk_document(&doc.content, &doc.doc_id, &doc.doc_path)?;
        all_parents.extend(parents);
        all_children.extend(children);
    }
    println!(
        "Chunked {} files into {} parents / {} children",
        docs.len(),
        all_parents.len(),
        all_children.len()
    );

    let tantivy_dir: String = config
        .get("data.tantivy_index_dir")
        .unwrap_or_else(|_| "data/indexes/tantivy".to_string());
    let lancedb_dir = PathBuf::from(
        config
            .get::<String>("data.lancedb_dir")
            .unwrap_or_else(|_| "data/indexes/lancedb".to_string()),
    );
    if lancedb_dir.exists() {
        fs::remove_dir_all(&lancedb_dir)?;
    }
    fs::create_dir_all(&lancedb_dir)?;

    let rt = tokio::runtime::Runtime::new()?;
    let parent_store =
        rt.block_on(async { LanceParentStore::connect(&lancedb_dir, "parents").await })?;
    parent_store.put(&all_parents)?;
    println!("📊 Stored {} parents", all_parents.len());

    let text = TantivyChildIndexer::create(&PathBuf::from(&tantivy_dir))?;
    println!("Created Tantivy index at: {tantivy_dir}");
    let vector = rt.block_on(async { LanceChildIndexer::connect(&lancedb_dir, "children").await })?;
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder()?);

    let engine = HybridSearchEngine::new(text, vector, embedder, config.retrieval());
    engine.index(&all_children)?;

    println!("\n✅ Ingest completed successfully!");
    println!("💡 To search, use: cargo run --bin viemed-search -- \"<query>\"");
    Ok(())
}
