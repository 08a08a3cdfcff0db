use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

use super::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

// Changing either key changes every vector; bump HASHING_VERSION with it.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;
const HASHING_VERSION: &str = "v1";

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// No model download, no network. Shared vocabulary between two texts is the
/// only thing it measures, so it is a stand-in for offline runs and tests
/// rather than a replacement for a sentence-embedding model.
pub struct HashingEmbedder {
    dimension: usize,
    model: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("hashing-{HASHING_VERSION}-{dimension}"),
        }
    }

    fn hash(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let h = self.hash(&token);
            let idx = (h % self.dimension as u64) as usize;
            // High bit picks the sign so collisions tend to cancel instead of pile up.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn encode(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(EmbeddingVector::new(self.model.clone(), self.embed(text)))
    }
}

/// Lower-cased tokens. `+`, `#` and `.` stay inside tokens so "c++", "c#" and
/// "node.js" survive; sentence-final dots are trimmed.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_language_names() {
        let tokens = tokenize("Shipped C++, C# and Node.js services.");
        assert_eq!(
            tokens,
            vec!["shipped", "c++", "c#", "and", "node.js", "services"]
        );
    }

    #[tokio::test]
    async fn test_vectors_are_l2_normalized() {
        let embedder = HashingEmbedder::new(384);
        let v = embedder
            .encode("Backend engineer building Python APIs")
            .await
            .unwrap();
        let norm: f32 = v.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "L2 norm should be 1.0, got {norm}");
        assert_eq!(v.dimension(), 384);
    }

    #[tokio::test]
    async fn test_encoding_is_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.encode("rust tokio axum").await.unwrap();
        let b = embedder.encode("rust tokio axum").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_blank_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.encode("  ... ").await.unwrap();
        assert!(v.values.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_model_id_carries_version_and_dimension() {
        assert_eq!(HashingEmbedder::new(384).model_id(), "hashing-v1-384");
        assert_eq!(HashingEmbedder::new(0).model_id(), "hashing-v1-1");
    }
}
