//! Non-semantic candidate filters and result summaries.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scorer::{skill_overlap, to_score};
use super::ScoringError;
use crate::models::candidate::CandidateProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSearchHit {
    pub id: Uuid,
    pub name: String,
    pub skill_match_percentage: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Candidates holding at least one of `required`, best overlap first.
pub fn search_by_skills<'a>(
    required: &[String],
    candidates: impl IntoIterator<Item = &'a CandidateProfile>,
) -> Result<Vec<SkillSearchHit>, ScoringError> {
    if required.is_empty() {
        return Err(ScoringError::InvalidArgument(
            "requiredSkills must not be empty".to_string(),
        ));
    }

    let mut hits = Vec::new();
    for candidate in candidates {
        let overlap = skill_overlap(required, &candidate.profile.skills)?;
        if overlap.matched.is_empty() {
            continue;
        }
        hits.push(SkillSearchHit {
            id: candidate.id,
            name: candidate.profile.name.clone(),
            skill_match_percentage: to_score(overlap.percentage),
            matched_skills: overlap.matched,
            missing_skills: overlap.missing,
        });
    }

    hits.sort_by(|a, b| b.skill_match_percentage.cmp(&a.skill_match_percentage));
    Ok(hits)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ExperienceLevel::Junior => &["junior", "entry", "graduate", "0-2 years", "fresher"],
            ExperienceLevel::Mid => &["mid", "intermediate", "2-5 years", "experienced"],
            ExperienceLevel::Senior => &[
                "senior",
                "lead",
                "principal",
                "5+ years",
                "expert",
                "architect",
            ],
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords().iter().any(|k| text.contains(k))
    }
}

impl FromStr for ExperienceLevel {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "junior" => Ok(ExperienceLevel::Junior),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            other => Err(ScoringError::InvalidArgument(format!(
                "unknown experience level '{other}'"
            ))),
        }
    }
}

/// Keeps candidates whose resume text mentions any keyword of `level`.
pub fn filter_by_experience<'a>(
    level: ExperienceLevel,
    candidates: &'a [CandidateProfile],
) -> Vec<&'a CandidateProfile> {
    candidates
        .iter()
        .filter(|c| level.matches(&c.profile.raw_text))
        .collect()
}

/// One-line reading of a match score.
pub fn explain_match(match_score: u32) -> &'static str {
    match match_score {
        90.. => "Excellent match! This candidate has most of the required skills.",
        75..=89 => "Good match. The candidate meets many of the requirements.",
        60..=74 => "Moderate match. Some key skills are present but training may be needed.",
        _ => "Low match. Significant skill gaps exist.",
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total_results: usize,
    pub average_match: u32,
    pub top_match: u32,
    pub bottom_match: u32,
}

impl SearchStats {
    pub fn from_scores(scores: &[u32]) -> Self {
        let (Some(&top), Some(&bottom)) = (scores.iter().max(), scores.iter().min()) else {
            return Self::default();
        };
        let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
        Self {
            total_results: scores.len(),
            average_match: (sum as f64 / scores.len() as f64).round() as u32,
            top_match: top,
            bottom_match: bottom,
        }
    }
}
