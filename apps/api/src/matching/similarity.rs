//! Semantic Similarity Scorer: cosine similarity of resume and JD embeddings.
//!
//! Percentage = cosine × 100, clamped to [0, 100]. Negative cosines score 0
//! and a zero-norm vector on either side scores 0. Vectors from different
//! models or with different dimensions are rejected, never compared.

use crate::embeddings::{EmbeddingProvider, EmbeddingVector};
use crate::matching::error::MatchError;
use crate::matching::models::TextBlock;

pub struct SemanticScorer<'a> {
    provider: &'a dyn EmbeddingProvider,
}

impl<'a> SemanticScorer<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider) -> Self {
        Self { provider }
    }

    /// Encodes each text once (identical texts once in total) and returns the
    /// similarity percentage. Provider failures propagate as `MatchError::Provider`.
    pub async fn similarity(
        &self,
        resume_text: &TextBlock,
        jd_text: &TextBlock,
    ) -> Result<f64, MatchError> {
        let (resume_vector, jd_vector) = if resume_text == jd_text {
            let vector = self.provider.encode(resume_text.as_str()).await?;
            (vector.clone(), vector)
        } else {
            tokio::try_join!(
                self.provider.encode(resume_text.as_str()),
                self.provider.encode(jd_text.as_str())
            )?
        };

        let cosine = cosine_similarity(&resume_vector, &jd_vector)?;
        Ok(to_percentage(cosine))
    }
}

/// `dot(a, b) / (‖a‖ · ‖b‖)`, accumulated in f64. Returns 0 if either norm is 0.
pub fn cosine_similarity(a: &EmbeddingVector, b: &EmbeddingVector) -> Result<f64, MatchError> {
    if a.model != b.model {
        return Err(MatchError::ModelMismatch {
            left: a.model.clone(),
            right: b.model.clone(),
        });
    }
    if a.dimension() != b.dimension() {
        return Err(MatchError::DimensionMismatch {
            left: a.dimension(),
            right: b.dimension(),
        });
    }
    if a.values.iter().chain(&b.values).any(|x| !x.is_finite()) {
        return Err(MatchError::InvalidEmbedding(format!(
            "vector from '{}' contains non-finite components",
            a.model
        )));
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.values.iter().zip(&b.values) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

fn to_percentage(cosine: f64) -> f64 {
    (cosine * 100.0).clamp(0.0, 100.0)
}
