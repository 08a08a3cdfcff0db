//! Score Fusion Engine: weighted blend of exact-skill and semantic scores.
//!
//! final = exact × w_exact + semantic × w_semantic, with the default weights
//! below. Reported percentages are rounded to 2 dp; the reported final score
//! is computed from the reported component scores so the formula holds on the
//! report itself. Unrounded values stay in `ScoreReport::raw`.

use serde::{Deserialize, Serialize};

use crate::matching::error::MatchError;
use crate::matching::models::{MatchResult, RawScores, ScoreReport};

/// Trust placed in literal keyword overlap.
pub const EXACT_SKILLS_WEIGHT: f64 = 0.40;
/// Trust placed in contextual (embedding) relevance.
pub const SEMANTIC_WEIGHT: f64 = 0.60;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub exact_skills: f64,
    pub semantic: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            exact_skills: EXACT_SKILLS_WEIGHT,
            semantic: SEMANTIC_WEIGHT,
        }
    }
}

impl FusionWeights {
    /// Weights must be finite, non-negative and sum to 1 so the final score
    /// stays within [0, 100].
    pub fn new(exact_skills: f64, semantic: f64) -> Result<Self, MatchError> {
        for (name, w) in [("exact_skills", exact_skills), ("semantic", semantic)] {
            if !w.is_finite() || w < 0.0 {
                return Err(MatchError::InvalidInput(format!(
                    "{name} weight must be a non-negative number, got {w}"
                )));
            }
        }
        let sum = exact_skills + semantic;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatchError::InvalidInput(format!(
                "fusion weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(Self {
            exact_skills,
            semantic,
        })
    }

    fn combine(&self, exact: f64, semantic: f64) -> f64 {
        exact * self.exact_skills + semantic * self.semantic
    }
}

pub fn fuse(
    match_result: &MatchResult,
    similarity: f64,
    weights: &FusionWeights,
) -> Result<ScoreReport, MatchError> {
    let exact = check_percentage("exact_match_percentage", match_result.exact_match_percentage)?;
    let semantic = check_percentage("similarity", similarity)?;

    let exact_skills_score = round2(exact);
    let ai_context_score = round2(semantic);

    Ok(ScoreReport {
        final_score: round2(weights.combine(exact_skills_score, ai_context_score)),
        exact_skills_score,
        ai_context_score,
        matched_skills: match_result.matched_skills.clone(),
        missing_skills: match_result.missing_skills.clone(),
        raw: RawScores {
            final_score: weights.combine(exact, semantic),
            exact_skills_score: exact,
            ai_context_score: semantic,
        },
    })
}

/// Rounds to 2 decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_percentage(name: &str, value: f64) -> Result<f64, MatchError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(MatchError::InvalidInput(format!(
            "{name} must be a number in [0, 100], got {value}"
        )));
    }
    Ok(value)
}
