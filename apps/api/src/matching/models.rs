use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matching::error::MatchError;

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// Normalized skill tokens: trimmed, lower-cased, deduplicated.
///
/// Resume and job-description skills go through the same constructor, so
/// membership is plain string equality afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    /// `field` names the input in validation errors.
    pub fn from_tokens<I, S>(field: &str, tokens: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for (i, token) in tokens.into_iter().enumerate() {
            let normalized = normalize_skill(token.as_ref());
            if normalized.is_empty() {
                return Err(MatchError::InvalidInput(format!(
                    "{field}[{i}] is blank"
                )));
            }
            set.insert(normalized);
        }
        Ok(Self(set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

fn normalize_skill(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Full resume or job-description text. Only ever embedded, never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock(String);

impl TextBlock {
    pub fn new(field: &str, text: impl Into<String>) -> Result<Self, MatchError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MatchError::InvalidInput(format!("{field} cannot be empty")));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated engine input. Only obtainable through `new` or `TryFrom<MatchRequestBody>`.
#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub resume_text: TextBlock,
    pub jd_text: TextBlock,
    pub resume_skills: SkillSet,
    pub jd_skills: SkillSet,
}

impl MatchRequest {
    pub fn new<S: AsRef<str>>(
        resume_text: impl Into<String>,
        jd_text: impl Into<String>,
        resume_skills: &[S],
        jd_skills: &[S],
    ) -> Result<Self, MatchError> {
        Ok(Self {
            resume_text: TextBlock::new("resume_text", resume_text)?,
            jd_text: TextBlock::new("jd_text", jd_text)?,
            resume_skills: SkillSet::from_tokens("resume_skills", resume_skills)?,
            jd_skills: SkillSet::from_tokens("jd_skills", jd_skills)?,
        })
    }
}

/// Wire shape of a match request. Every field is optional here so a missing
/// or `null` field is reported by name instead of as a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct MatchRequestBody {
    pub resume_text: Option<String>,
    pub jd_text: Option<String>,
    pub resume_skills: Option<Vec<String>>,
    pub jd_skills: Option<Vec<String>>,
}

impl TryFrom<MatchRequestBody> for MatchRequest {
    type Error = MatchError;

    fn try_from(body: MatchRequestBody) -> Result<Self, Self::Error> {
        MatchRequest::new(
            required(body.resume_text, "resume_text")?,
            required(body.jd_text, "jd_text")?,
            &required(body.resume_skills, "resume_skills")?,
            &required(body.jd_skills, "jd_skills")?,
        )
    }
}

/// Wire shape of a skills-only comparison.
#[derive(Debug, Default, Deserialize)]
pub struct SkillsRequestBody {
    pub resume_skills: Option<Vec<String>>,
    pub jd_skills: Option<Vec<String>>,
}

impl SkillsRequestBody {
    pub fn into_skill_sets(self) -> Result<(SkillSet, SkillSet), MatchError> {
        let resume = SkillSet::from_tokens(
            "resume_skills",
            required(self.resume_skills, "resume_skills")?,
        )?;
        let jd = SkillSet::from_tokens("jd_skills", required(self.jd_skills, "jd_skills")?)?;
        Ok((resume, jd))
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, MatchError> {
    value.ok_or_else(|| MatchError::InvalidInput(format!("{field} is required")))
}

// ────────────────────────────────────────────────────────────────────────────
// Outputs
// ────────────────────────────────────────────────────────────────────────────

/// Output of the skill set matcher. `exact_match_percentage` is unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub exact_match_percentage: f64,
}

/// Unrounded component and final scores, kept for numeric checks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawScores {
    pub final_score: f64,
    pub exact_skills_score: f64,
    pub ai_context_score: f64,
}

/// Final report returned to callers. Percentages are rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub final_score: f64,
    pub exact_skills_score: f64,
    pub ai_context_score: f64,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    #[serde(skip)]
    pub raw: RawScores,
}
