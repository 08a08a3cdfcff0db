use std::sync::Arc;

use tracing::{debug, info, Instrument};

use crate::embeddings::EmbeddingProvider;
use crate::matching::error::MatchError;
use crate::matching::fusion::{fuse, FusionWeights};
use crate::matching::models::{MatchRequest, MatchResult, ScoreReport, SkillSet};
use crate::matching::similarity::SemanticScorer;
use crate::matching::skills::match_skills;

/// Resume ↔ JD scoring pipeline: skill matcher and semantic scorer run
/// concurrently, fusion runs once both have finished.
///
/// Holds no per-request state. Carried in `AppState` behind an `Arc`.
pub struct MatchEngine {
    provider: Arc<dyn EmbeddingProvider>,
    weights: FusionWeights,
}

impl MatchEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, weights: FusionWeights) -> Self {
        Self { provider, weights }
    }

    pub fn embedding_model(&self) -> &str {
        self.provider.model_id()
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Skills-only breakdown. Never touches the embedding provider.
    pub fn match_skills(&self, resume_skills: &SkillSet, jd_skills: &SkillSet) -> MatchResult {
        match_skills(resume_skills, jd_skills)
    }

    /// Full score report. Dropping the returned future cancels any in-flight
    /// encode; fusion never sees a partial similarity.
    pub async fn evaluate(&self, request: &MatchRequest) -> Result<ScoreReport, MatchError> {
        let span = tracing::debug_span!("evaluate", model = self.embedding_model());

        async move {
            debug!(
                resume_skills = request.resume_skills.len(),
                jd_skills = request.jd_skills.len(),
                "Scoring resume against job description"
            );

            let scorer = SemanticScorer::new(self.provider.as_ref());
            let (match_result, similarity) = tokio::join!(
                async { self.match_skills(&request.resume_skills, &request.jd_skills) },
                scorer.similarity(&request.resume_text, &request.jd_text),
            );
            let similarity = similarity?;

            let report = fuse(&match_result, similarity, &self.weights)?;
            info!(
                final_score = report.final_score,
                exact_skills_score = report.exact_skills_score,
                ai_context_score = report.ai_context_score,
                missing = report.missing_skills.len(),
                "Match scored"
            );
            Ok::<_, MatchError>(report)
        }
        .instrument(span)
        .await
    }
}
