//! Skill Set Matcher: literal keyword overlap between resume and JD skills.
//!
//! matched = resume ∩ jd, missing = jd − resume. Skills only on the resume
//! are not reported. Exact-match percentage is `|matched| / |jd| × 100`, and
//! exactly `0` when the JD lists no skills.

use std::collections::BTreeSet;

use crate::matching::models::{MatchResult, SkillSet};

pub fn match_skills(resume_skills: &SkillSet, jd_skills: &SkillSet) -> MatchResult {
    let (matched_skills, missing_skills): (BTreeSet<String>, BTreeSet<String>) = jd_skills
        .iter()
        .cloned()
        .partition(|skill| resume_skills.contains(skill));

    MatchResult {
        exact_match_percentage: exact_match_percentage(&matched_skills, jd_skills),
        matched_skills,
        missing_skills,
    }
}

fn exact_match_percentage(matched: &BTreeSet<String>, jd_skills: &SkillSet) -> f64 {
    if jd_skills.is_empty() {
        return 0.0;
    }
    matched.len() as f64 / jd_skills.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(tokens: &[&str]) -> SkillSet {
        SkillSet::from_tokens("skills", tokens).unwrap()
    }

    fn set(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perfect_match() {
        let backend = skills(&["python", "backend", "apis", "sql"]);
        let result = match_skills(&backend, &backend);

        assert_eq!(result.exact_match_percentage, 100.0);
        assert_eq!(result.matched_skills, set(&["python", "backend", "apis", "sql"]));
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_complete_mismatch() {
        let resume = skills(&["illustrator", "photoshop", "branding"]);
        let jd = skills(&["python", "backend", "apis", "sql"]);
        let result = match_skills(&resume, &jd);

        assert_eq!(result.exact_match_percentage, 0.0);
        assert!(result.matched_skills.is_empty());
        assert_eq!(result.missing_skills, set(&["python", "backend", "apis", "sql"]));
    }

    #[test]
    fn test_empty_jd_skills_scores_zero() {
        let resume = skills(&["python", "sql"]);
        let result = match_skills(&resume, &skills(&[]));

        assert_eq!(result.exact_match_percentage, 0.0);
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_partial_match_is_jd_relative() {
        let resume = skills(&["Python", "Data Analysis", "Machine Learning"]);
        let jd = skills(&["Python", "Data Analysis", "Communication"]);
        let result = match_skills(&resume, &jd);

        assert_eq!(result.matched_skills, set(&["python", "data analysis"]));
        assert_eq!(result.missing_skills, set(&["communication"]));
        // "machine learning" is resume-only and never surfaces
        assert!(!result.missing_skills.contains("machine learning"));
        assert!((result.exact_match_percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_matched_and_missing_are_exact_set_operations() {
        let resume = skills(&["rust", "go", "kafka", "docker"]);
        let jd = skills(&["rust", "kafka", "kubernetes", "terraform", "go"]);
        let result = match_skills(&resume, &jd);

        let resume_set: BTreeSet<String> = resume.iter().cloned().collect();
        let jd_set: BTreeSet<String> = jd.iter().cloned().collect();
        let intersection: BTreeSet<String> = resume_set.intersection(&jd_set).cloned().collect();
        let difference: BTreeSet<String> = jd_set.difference(&resume_set).cloned().collect();

        assert_eq!(result.matched_skills, intersection);
        assert_eq!(result.missing_skills, difference);
        assert!((result.exact_match_percentage - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_bounded_0_to_100() {
        let resume = skills(&["a", "b", "c", "d", "e"]);
        for jd in [skills(&["a"]), skills(&["z"]), skills(&["a", "z"])] {
            let pct = match_skills(&resume, &jd).exact_match_percentage;
            assert!((0.0..=100.0).contains(&pct), "got {pct}");
        }
    }

    #[test]
    fn test_empty_resume_skills_misses_everything() {
        let jd = skills(&["rust", "sql"]);
        let result = match_skills(&skills(&[]), &jd);
        assert_eq!(result.exact_match_percentage, 0.0);
        assert_eq!(result.missing_skills, set(&["rust", "sql"]));
    }
}
