use thiserror::Error;

use crate::embeddings::EmbeddingError;

/// Failures of the matching engine.
///
/// Empty job-description skills and zero-norm embeddings are not errors; they
/// score `0` by definition.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding provider failure: {0}")]
    Provider(#[from] EmbeddingError),

    #[error("Embeddings come from different models: '{left}' vs '{right}'")]
    ModelMismatch { left: String, right: String },

    #[error("Embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(String),
}

impl MatchError {
    /// Only provider failures can succeed on retry; everything else is deterministic.
    pub fn is_retriable(&self) -> bool {
        match self {
            MatchError::Provider(e) => e.is_retriable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_outage_is_retriable() {
        let err = MatchError::from(EmbeddingError::Api {
            status: 503,
            message: "unavailable".to_string(),
        });
        assert!(err.is_retriable());
    }

    #[test]
    fn test_validation_is_not_retriable() {
        let err = MatchError::InvalidInput("resume_text is required".to_string());
        assert!(!err.is_retriable());
        assert_eq!(err.to_string(), "Invalid input: resume_text is required");
    }
}
