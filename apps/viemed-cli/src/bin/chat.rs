use std::io::{BufRead, Write};
use std::{env, path::PathBuf, sync::Arc};

use viemed_core::config::Config;
use viemed_core::traits::{Embedder, Reranker};
use viemed_embed::get_default_embedder;
use viemed_llm::{GeminiProvider, MedicalAgent, PromptBuilder};
use viemed_retrieval::{EmbeddingReranker, HybridSearchEngine, RagRetriever, RagService};
use viemed_text::TantivyChildIndexer;
use viemed_vector::{LanceChildIndexer, LanceParentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load()?;

    // --direct: skip the tool-calling agent and run the plain RAG pipeline
    let direct = env::args().skip(1).any(|a| a == "--direct");

    let params = config.retrieval();
    let llm_params = config.llm();
    let tantivy_dir: String = config
        .get("data.tantivy_index_dir")
        .unwrap_or_else(|_| "data/indexes/tantivy".to_string());
    let lancedb_dir = PathBuf::from(
        config
            .get::<String>("data.lancedb_dir")
            .unwrap_or_else(|_| "data/indexes/lancedb".to_string()),
    );

    let text = TantivyChildIndexer::open(&PathBuf::from(&tantivy_dir))?;
    let vector = LanceChildIndexer::connect(&lancedb_dir, "children").await?;
    let parents = LanceParentStore::connect(&lancedb_dir, "parents").await?;
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder()?);
    let reranker: Option<Box<dyn Reranker>> = Some(Box::new(EmbeddingReranker::new(
        embedder.clone(),
        params.rerank_top_n,
    )));
    let engine = HybridSearchEngine::new(text, vector, embedder, params);
    let retriever = RagRetriever::new(engine, reranker, Box::new(parents));

    let provider = GeminiProvider::from_params(&llm_params)?;

    println!("VieMed Chat (gõ 'exit' để thoát)\n");
    let stdin = std::io::stdin();

    if direct {
        let service = RagService::new(
            retriever,
            Box::new(provider),
            PromptBuilder::new(&llm_params.language),
        );
        loop {
            let Some(query) = read_query(&stdin)? else { break };
            let result = service.generate_answer(&query, true).await;
            if result.has_context {
                println!("📚 ({} tài liệu tham khảo)", result.context_used.len());
            }
            println!("🤖 {}\n", result.answer);
        }
        return Ok(());
    }

    let agent = MedicalAgent::new(Box::new(provider), Box::new(retriever));
    loop {
        let Some(query) = read_query(&stdin)? else { break };
        let reply = agent.chat(&query).await;
        if reply.used_tools {
            for call in &reply.tool_calls {
                println!("🔧 {} ({})", call.tool, call.input);
            }
        }
        println!("🤖 {}\n", reply.answer);
    }
    Ok(())
}

fn read_query(stdin: &std::io::Stdin) -> anyhow::Result<Option<String>> {
    print!("👤 ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim().to_string();
    if line.is_empty() {
        return read_query(stdin);
    }
    if line == "exit" || line == "quit" {
        return Ok(None);
    }
    Ok(Some(line))
}
