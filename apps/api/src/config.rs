use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::matching::fusion::{EXACT_SKILLS_WEIGHT, SEMANTIC_WEIGHT};
use crate::matching::FusionWeights;

const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/v1/embeddings` server.
    Http { api_url: String },
    /// Local feature hashing; no network.
    Hashing,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub embedding_timeout: Duration,
    pub embedding_max_retries: u32,
    /// 0 disables the embedding cache.
    pub embedding_cache_capacity: usize,
    pub fusion_weights: FusionWeights,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let embedding_backend = match var("EMBEDDING_BACKEND")
            .unwrap_or_else(|| "http".to_string())
            .to_lowercase()
            .as_str()
        {
            "http" => EmbeddingBackend::Http {
                api_url: var("EMBEDDING_API_URL").ok_or_else(|| {
                    anyhow!("Required environment variable 'EMBEDDING_API_URL' is not set")
                })?,
            },
            "hashing" => EmbeddingBackend::Hashing,
            other => bail!("EMBEDDING_BACKEND must be 'http' or 'hashing', got '{other}'"),
        };

        let fusion_weights = FusionWeights::new(
            parse_or(&var, "FUSION_EXACT_WEIGHT", EXACT_SKILLS_WEIGHT)?,
            parse_or(&var, "FUSION_SEMANTIC_WEIGHT", SEMANTIC_WEIGHT)?,
        )
        .context("FUSION_EXACT_WEIGHT and FUSION_SEMANTIC_WEIGHT are invalid")?;

        Ok(Config {
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            embedding_backend,
            embedding_api_key: var("EMBEDDING_API_KEY").filter(|k| !k.is_empty()),
            embedding_model: var("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: parse_or(&var, "EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
            embedding_timeout: Duration::from_secs(parse_or(&var, "EMBEDDING_TIMEOUT_SECS", 30)?),
            embedding_max_retries: parse_or(&var, "EMBEDDING_MAX_RETRIES", 3)?,
            embedding_cache_capacity: parse_or(&var, "EMBEDDING_CACHE_CAPACITY", 0)?,
            fusion_weights,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
