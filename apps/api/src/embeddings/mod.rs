//! Embedding providers, the single seam through which text becomes vectors.
//!
//! The matching engine never talks to a model directly. It receives an
//! `Arc<dyn EmbeddingProvider>` at startup and calls `encode` on it.
//!
//! Backends:
//! - `HttpEmbeddingClient`: OpenAI-compatible `/v1/embeddings` endpoint.
//! - `HashingEmbedder`: deterministic feature hashing, no network.
//! - `CachedEmbeddingProvider`: optional `(model, text)` cache around either.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cache;
pub mod hashing;
pub mod http;

pub use cache::CachedEmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use http::HttpEmbeddingClient;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Embedding provider returned no vectors")]
    EmptyResponse,
}

impl EmbeddingError {
    /// Transport failures, rate limits and server errors may succeed on a later attempt.
    pub fn is_retriable(&self) -> bool {
        match self {
            EmbeddingError::Http(_) => true,
            EmbeddingError::Api { status, .. } => *status == 429 || *status >= 500,
            EmbeddingError::Parse(_) | EmbeddingError::EmptyResponse => false,
        }
    }
}

/// A dense vector tagged with the model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub model: String,
    pub values: Vec<f32>,
}

impl EmbeddingVector {
    pub fn new(model: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            values,
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// Text → vector capability. Implementations must be deterministic for a
/// fixed model: same text, same model ⇒ same vector (to numerical tolerance).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the model every vector from this provider is tagged with.
    fn model_id(&self) -> &str;

    async fn encode(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}
