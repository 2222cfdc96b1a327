//! BGE-M3 embeddings via candle, plus a deterministic fake embedder for
//! offline tests (`APP_USE_FAKE_EMBEDDINGS=1`).

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use viemed_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::masked_mean_l2;

pub const EMBEDDING_DIM: usize = 1024;
pub const MAX_LEN: usize = 256;

pub struct EmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingModel {
    pub fn new() -> Result<Self> {
        let device = device::select_device();
        println!("🔄 Loading BGE-M3 model from local files...");
        let model_dir = resolve_model_dir()?;
        println!("📥 Loading tokenizer...");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!(
                "Failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            )
        })?;
        println!("📥 Loading model config...");
        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        println!("📥 Loading model weights...");
        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        println!("✅ BGE-M3 model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, MAX_LEN, &self.device)?;
        let token_type_ids = Tensor::zeros((1, MAX_LEN), DType::I64, &self.device)?;
        let hidden_states =
            self.model
                .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden_states, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != EMBEDDING_DIM {
            return Err(anyhow!(
                "unexpected embedding dim {} (wanted {})",
                emb.len(),
                EMBEDDING_DIM
            ));
        }
        Ok(emb)
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    fn max_len(&self) -> usize {
        MAX_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

/// Hash-based stand-in embedder: stable, normalized, model-free.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        MAX_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let mut v = vec![0f32; self.dim];
            for (i, token) in text.split_whitespace().enumerate() {
                let mut hasher = XxHash64::with_seed(0);
                token.hash(&mut hasher);
                let h = hasher.finish();
                let idx = (h as usize) % self.dim;
                let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
                v[idx] += val + (i as f32 % 3.0) * 0.01;
            }
            let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
            for x in &mut v {
                *x /= norm;
            }
            out.push(v);
        }
        Ok(out)
    }
}

pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        println!("🧪 Using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(EMBEDDING_DIM)));
    }
    Ok(Box::new(EmbeddingModel::new()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            println!("📦 Using APP_MODEL_DIR: {}", p.display());
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            println!("📦 Using MODEL_DIR: {}", p.display());
            return Ok(p);
        }
    }
    for candidate in ["models/bge-m3", "../models/bge-m3"] {
        let p = Path::new(candidate);
        if p.exists() {
            println!("📦 Using model dir: {}", p.display());
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate BGE-M3 model directory"))
}
