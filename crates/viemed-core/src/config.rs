//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars, plus typed sections for the retrieval and LLM parameters with the
//! tuned defaults baked in as serde defaults.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Retrieval parameters from the `[retrieval]` section, falling back to
    /// the tuned baseline when the section or individual keys are absent.
    pub fn retrieval(&self) -> RetrievalParams {
        self.get("retrieval").unwrap_or_default()
    }

    /// LLM parameters from the `[llm]` section.
    pub fn llm(&self) -> LlmParams {
        self.get("llm").unwrap_or_default()
    }
}

/// Knobs of the hybrid retrieval pipeline.
///
/// `k1`/`k2` are candidate counts for the vector and BM25 legs; the weights
/// apply to min-max normalized per-engine scores. Reranking keeps at most
/// `rerank_top_n` passages scoring at least `rerank_threshold`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalParams {
    pub k1: usize,
    pub k2: usize,
    pub vector_weight: f32,
    pub bm25_weight: f32,
    pub top_k: usize,
    pub rerank_threshold: f32,
    pub rerank_top_n: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            k1: 10,
            k2: 10,
            vector_weight: 0.6,
            bm25_weight: 0.4,
            top_k: 5,
            rerank_threshold: 0.3,
            rerank_top_n: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmParams {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub language: String,
}

impl Default for LlmParams {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.4,
            max_output_tokens: 4096,
            language: "vi".to_string(),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
