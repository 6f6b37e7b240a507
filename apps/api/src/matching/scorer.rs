//! Composite match score: explicit skill overlap blended with semantic similarity.
//!
//! matchScore = round(0.6 × skillMatchPercentage + 0.4 × semanticScore)
//!
//! Negative cosine similarity is clamped to a semantic score of 0 before
//! weighting, so every reported score lies in 0–100.

use serde::Serialize;
use uuid::Uuid;

use super::similarity::cosine_similarity;
use super::ScoringError;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;

pub const SKILL_WEIGHT: f64 = 0.6;
pub const SEMANTIC_WEIGHT: f64 = 0.4;

/// Read-only outcome of scoring one subject against one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub subject_id: Uuid,
    pub target_id: Uuid,
    pub skill_match_percentage: u32,
    pub semantic_score: u32,
    pub match_score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Required skills split by presence in a profile, in required order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverlap {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// Unrounded, 0–100.
    pub percentage: f64,
}

/// Case-insensitive overlap of `required` against `profile_skills`.
///
/// An empty `required` list has no meaningful percentage and is rejected.
pub fn skill_overlap(
    required: &[String],
    profile_skills: &[String],
) -> Result<SkillOverlap, ScoringError> {
    if required.is_empty() {
        return Err(ScoringError::InvalidArgument(
            "requiredSkills must not be empty".to_string(),
        ));
    }

    let have: Vec<String> = profile_skills.iter().map(|s| s.to_lowercase()).collect();
    let (matched, missing): (Vec<String>, Vec<String>) = required
        .iter()
        .cloned()
        .partition(|skill| have.contains(&skill.to_lowercase()));

    let percentage = matched.len() as f64 / required.len() as f64 * 100.0;
    Ok(SkillOverlap {
        matched,
        missing,
        percentage,
    })
}

/// Cosine similarity scaled to 0–100, negatives clamped to 0. Unrounded.
pub fn semantic_score(a: &[f32], b: &[f32]) -> Result<f64, ScoringError> {
    Ok((cosine_similarity(a, b)? * 100.0).max(0.0))
}

pub fn combine(skill_percentage: f64, semantic: f64) -> u32 {
    to_score(SKILL_WEIGHT * skill_percentage + SEMANTIC_WEIGHT * semantic)
}

pub(crate) fn to_score(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

/// Scores a candidate against a job.
///
/// Both must carry a non-placeholder embedding and the job must list at
/// least one required skill.
pub fn score(candidate: &CandidateProfile, job: &JobPosting) -> Result<MatchResult, ScoringError> {
    let overlap = skill_overlap(&job.required_skills, &candidate.profile.skills)?;

    let candidate_vector = usable_embedding(candidate.embedding(), "candidate", candidate.id)?;
    let job_vector = usable_embedding(job.embedding.as_ref(), "job", job.id)?;
    let semantic = semantic_score(candidate_vector, job_vector)?;

    Ok(MatchResult {
        subject_id: candidate.id,
        target_id: job.id,
        skill_match_percentage: to_score(overlap.percentage),
        semantic_score: to_score(semantic),
        match_score: combine(overlap.percentage, semantic),
        matched_skills: overlap.matched,
        missing_skills: overlap.missing,
    })
}

fn usable_embedding<'a>(
    embedding: Option<&'a crate::embedding::Embedding>,
    kind: &str,
    id: Uuid,
) -> Result<&'a [f32], ScoringError> {
    match embedding {
        Some(e) if !e.is_placeholder() => Ok(e.values()),
        Some(_) => Err(ScoringError::InvalidArgument(format!(
            "{kind} {id} only has a placeholder embedding"
        ))),
        None => Err(ScoringError::InvalidArgument(format!(
            "{kind} {id} has no embedding"
        ))),
    }
}
