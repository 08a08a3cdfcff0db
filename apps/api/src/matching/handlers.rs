//! Axum route handlers for the Match API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::fusion::{round2, FusionWeights};
use crate::matching::models::{MatchRequest, MatchRequestBody, ScoreReport, SkillsRequestBody};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub request_id: Uuid,
    pub embedding_model: String,
    pub weights: FusionWeights,
    pub score_report: ScoreReport,
}

#[derive(Debug, Serialize)]
pub struct SkillsMatchResponse {
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub exact_match_percentage: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match
///
/// Scores resume text + skills against job-description text + skills.
/// Skills must already be extracted; no document parsing happens here.
pub async fn handle_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequestBody>, JsonRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let request = MatchRequest::try_from(body)?;

    let request_id = Uuid::new_v4();
    let score_report = state
        .engine
        .evaluate(&request)
        .instrument(tracing::info_span!("match_request", %request_id))
        .await?;

    Ok(Json(MatchResponse {
        request_id,
        embedding_model: state.engine.embedding_model().to_string(),
        weights: state.engine.weights(),
        score_report,
    }))
}

/// POST /api/v1/match/skills
///
/// Skill overlap only. Does not call the embedding provider.
pub async fn handle_match_skills(
    State(state): State<AppState>,
    payload: Result<Json<SkillsRequestBody>, JsonRejection>,
) -> Result<Json<SkillsMatchResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let (resume_skills, jd_skills) = body.into_skill_sets()?;

    let result = state.engine.match_skills(&resume_skills, &jd_skills);

    Ok(Json(SkillsMatchResponse {
        matched_skills: result.matched_skills,
        missing_skills: result.missing_skills,
        exact_match_percentage: round2(result.exact_match_percentage),
    }))
}
