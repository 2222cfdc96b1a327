//! Retrieval facade and the end-to-end RAG service.

use anyhow::Result;

use viemed_core::config::RetrievalParams;
use viemed_core::traits::{ParentStore, Reranker, TextIndexer, VectorIndexer};
use viemed_core::types::RetrievedDocument;
use viemed_llm::agent::{ContextSource, FALLBACK_ANSWER};
use viemed_llm::{LlmProvider, Message, PromptBuilder};

use crate::engine::{HybridSearchEngine, SearchMode};

pub struct RagRetriever<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    engine: HybridSearchEngine<TI, VI>,
    reranker: Option<Box<dyn Reranker>>,
    parents: Box<dyn ParentStore>,
}

impl<TI, VI> RagRetriever<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    pub fn new(
        engine: HybridSearchEngine<TI, VI>,
        reranker: Option<Box<dyn Reranker>>,
        parents: Box<dyn ParentStore>,
    ) -> Self {
        Self {
            engine,
            reranker,
            parents,
        }
    }

    pub fn engine(&self) -> &HybridSearchEngine<TI, VI> {
        &self.engine
    }

    fn params(&self) -> &RetrievalParams {
        self.engine.params()
    }

    /// Retrieve, optionally rerank, and return the ranked child documents.
    ///
    /// When a reranker is configured the engine over-fetches (`2 * top_k`)
    /// and the reranker cuts the list back down; rerank failure falls back to
    /// the unreranked head rather than surfacing an error.
    pub fn retrieve_documents(
        &self,
        query: &str,
        top_k: usize,
        mode: SearchMode,
    ) -> Result<Vec<RetrievedDocument>> {
        let initial_k = if self.reranker.is_some() {
            top_k * 2
        } else {
            top_k
        };
        tracing::info!(top_k, initial_k, ?mode, "retrieving");
        let docs = self.engine.search(query, initial_k, mode)?;

        let Some(reranker) = self.reranker.as_deref() else {
            return Ok(docs.into_iter().take(top_k).collect());
        };

        let passages: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
        match reranker.rerank(query, &passages, self.params().rerank_threshold) {
            Ok(ranked) => {
                tracing::info!(kept = ranked.len(), "reranked");
                Ok(ranked
                    .into_iter()
                    .take(top_k)
                    .filter_map(|(i, score)| {
                        docs.get(i).cloned().map(|mut d| {
                            d.hit.score = score;
                            d
                        })
                    })
                    .collect())
            }
            Err(e) => {
                tracing::warn!("reranking failed: {e}");
                Ok(docs.into_iter().take(top_k).collect())
            }
        }
    }

    /// Cleaned child passages, ready to feed a prompt.
    pub fn retrieve_context(
        &self,
        query: &str,
        top_k: usize,
        mode: SearchMode,
    ) -> Result<Vec<String>> {
        let docs = self.retrieve_documents(query, top_k, mode)?;
        Ok(preprocess_context(
            docs.into_iter().map(|d| d.content).collect(),
        ))
    }

    /// Expand ranked children into their parent sections, deduplicated and
    /// order-preserving, so generation sees the large chunks while matching
    /// used the small ones.
    pub fn retrieve_parent_context(
        &self,
        query: &str,
        top_k: usize,
        mode: SearchMode,
    ) -> Result<Vec<String>> {
        let docs = self.retrieve_documents(query, top_k, mode)?;
        let mut seen = std::collections::HashSet::new();
        let mut contexts = Vec::new();
        for doc in &docs {
            if !seen.insert(doc.parent_id.clone()) {
                continue;
            }
            match self.parents.get(&doc.parent_id)? {
                Some(parent) => contexts.push(format!("[{}] {}", parent.header, parent.content)),
                None => {
                    // child without a stored parent still contributes itself
                    tracing::warn!(parent_id = %doc.parent_id, "parent not found, using child");
                    contexts.push(doc.content.clone());
                }
            }
            if contexts.len() == top_k {
                break;
            }
        }
        Ok(preprocess_context(contexts))
    }
}

/// Strip newlines and markdown emphasis, dropping empty entries.
pub fn preprocess_context(context: Vec<String>) -> Vec<String> {
    context
        .into_iter()
        .map(|item| item.replace('\n', " ").replace('*', "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub has_context: bool,
    pub context_used: Vec<String>,
}

pub struct RagService<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    retriever: RagRetriever<TI, VI>,
    llm: Box<dyn LlmProvider>,
    prompts: PromptBuilder,
}

impl<TI, VI> RagService<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    pub fn new(
        retriever: RagRetriever<TI, VI>,
        llm: Box<dyn LlmProvider>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            retriever,
            llm,
            prompts,
        }
    }

    pub fn retriever(&self) -> &RagRetriever<TI, VI> {
        &self.retriever
    }

    /// Full pipeline: retrieve parent context, render the prompt, generate.
    /// Any failure returns the canned apology instead of an error.
    ///
    /// Must run on a multi-thread tokio runtime: the storage legs block.
    pub async fn generate_answer(&self, query: &str, use_rag: bool) -> GeneratedAnswer {
        let top_k = self.retriever.params().top_k;
        let context_docs = if use_rag {
            tokio::task::block_in_place(|| {
                self.retriever
                    .retrieve_parent_context(query, top_k, SearchMode::Hybrid)
            })
            .unwrap_or_else(|e| {
                tracing::error!("retrieval failed: {e}");
                vec![]
            })
        } else {
            vec![]
        };

        let context_str = if context_docs.is_empty() {
            tracing::warn!("no context found");
            None
        } else {
            Some(
                context_docs
                    .iter()
                    .enumerate()
                    .map(|(i, doc)| format!("[Document {}]:\n{}", i + 1, doc))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            )
        };

        let prompt = self.prompts.render(query, context_str.as_deref());
        match self.llm.chat(&[Message::user(prompt)]).await {
            Ok(answer) => GeneratedAnswer {
                answer,
                has_context: !context_docs.is_empty(),
                context_used: context_docs,
            },
            Err(e) => {
                tracing::error!("generation failed: {e}");
                GeneratedAnswer {
                    answer: FALLBACK_ANSWER.to_string(),
                    has_context: false,
                    context_used: vec![],
                }
            }
        }
    }
}

impl<TI, VI> ContextSource for RagRetriever<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        // called from the agent's async context while the storage legs spin
        // up their own runtime; requires the multi-thread flavor
        tokio::task::block_in_place(|| {
            self.retrieve_parent_context(query, top_k, SearchMode::Hybrid)
        })
    }
}
