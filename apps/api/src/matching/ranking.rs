//! Batch ranking over stored profiles and postings.
//!
//! Every pair is scored independently and the whole list is sorted once at
//! the end, so the output never depends on the order in which embeddings
//! arrived. Items that cannot be scored are reported in `skipped` rather than
//! dropped silently. A dimension mismatch is not skippable: it aborts the
//! whole ranking.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::scorer::{self, combine, skill_overlap, to_score, MatchResult};
use super::similarity::top_similar;
use super::ScoringError;
use crate::embedding::Embedding;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingEmbedding,
    PlaceholderEmbedding,
    EmbeddingUnavailable,
    /// The provider refused the text itself, e.g. over its token limit.
    EmbeddingRejected,
    NoRequiredSkills,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub id: Uuid,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SkippedItem {
    pub fn new(id: Uuid, reason: SkipReason) -> Self {
        Self {
            id,
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking<T> {
    pub results: Vec<T>,
    pub skipped: Vec<SkippedItem>,
}

/// One row of a free-text search. Explicit schema; stored fields beyond
/// these never reach the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: Uuid,
    pub name: String,
    pub match_score: u32,
    pub semantic_score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// The embedding's vector if it can take part in ranking, else why not.
fn rankable(embedding: Option<&Embedding>) -> Result<&[f32], SkipReason> {
    match embedding {
        Some(e) if e.is_placeholder() => Err(SkipReason::PlaceholderEmbedding),
        Some(e) => Ok(e.values()),
        None => Err(SkipReason::MissingEmbedding),
    }
}

/// Stable descending sort by score, then top-N.
fn sort_and_truncate<T>(items: &mut Vec<T>, top_n: usize, score: impl Fn(&T) -> u32) {
    items.sort_by(|a, b| score(b).cmp(&score(a)));
    items.truncate(top_n);
}

/// Scores every candidate against `job`, best first.
///
/// The job must list required skills and carry a usable embedding.
pub fn rank_candidates_for_job(
    job: &JobPosting,
    candidates: &[CandidateProfile],
    top_n: usize,
) -> Result<Ranking<MatchResult>, ScoringError> {
    if job.required_skills.is_empty() {
        return Err(ScoringError::InvalidArgument(format!(
            "job {} has no required skills",
            job.id
        )));
    }
    if let Err(reason) = rankable(job.embedding.as_ref()) {
        return Err(ScoringError::InvalidArgument(format!(
            "job {} cannot be ranked against: {reason:?}",
            job.id
        )));
    }

    let mut results = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();

    for candidate in candidates {
        if let Err(reason) = rankable(candidate.embedding()) {
            debug!("Skipping candidate {} ({reason:?})", candidate.id);
            skipped.push(SkippedItem::new(candidate.id, reason));
            continue;
        }
        results.push(scorer::score(candidate, job)?);
    }

    sort_and_truncate(&mut results, top_n, |r| r.match_score);
    Ok(Ranking { results, skipped })
}

/// Scores `candidate` against every job, best first. Jobs without required
/// skills or without a usable embedding are skipped.
pub fn rank_jobs_for_profile(
    candidate: &CandidateProfile,
    jobs: &[JobPosting],
    top_n: usize,
) -> Result<Ranking<MatchResult>, ScoringError> {
    if let Err(reason) = rankable(candidate.embedding()) {
        return Err(ScoringError::InvalidArgument(format!(
            "candidate {} cannot be ranked: {reason:?}",
            candidate.id
        )));
    }

    let mut results = Vec::with_capacity(jobs.len());
    let mut skipped = Vec::new();

    for job in jobs {
        if job.required_skills.is_empty() {
            debug!("Skipping job {} (no required skills)", job.id);
            skipped.push(SkippedItem::new(job.id, SkipReason::NoRequiredSkills));
            continue;
        }
        if let Err(reason) = rankable(job.embedding.as_ref()) {
            debug!("Skipping job {} ({reason:?})", job.id);
            skipped.push(SkippedItem::new(job.id, reason));
            continue;
        }
        results.push(scorer::score(candidate, job)?);
    }

    sort_and_truncate(&mut results, top_n, |r| r.match_score);
    Ok(Ranking { results, skipped })
}

/// Free-text search: nearest `max(pool_size, top_n)` candidates by cosine
/// similarity, rescored with skill overlap against `query_skills`, best first.
///
/// With no query skills the match score is the semantic score alone.
pub fn search_candidates(
    query: &Embedding,
    query_skills: &[String],
    candidates: &[CandidateProfile],
    top_n: usize,
    pool_size: usize,
) -> Result<Ranking<SearchHit>, ScoringError> {
    if query.is_placeholder() {
        return Err(ScoringError::InvalidArgument(
            "query embedding is a placeholder".to_string(),
        ));
    }

    let mut usable: Vec<(&CandidateProfile, &[f32])> = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();
    for candidate in candidates {
        match rankable(candidate.embedding()) {
            Ok(values) => usable.push((candidate, values)),
            Err(reason) => skipped.push(SkippedItem::new(candidate.id, reason)),
        }
    }

    let nearest = top_similar(query.values(), &usable, pool_size.max(top_n), |(_, v)| *v)?;

    let mut results = Vec::with_capacity(nearest.len());
    for ((candidate, _), similarity) in nearest {
        let semantic = (similarity * 100.0).max(0.0);
        let (match_score, matched_skills, missing_skills) = if query_skills.is_empty() {
            (to_score(semantic), Vec::new(), Vec::new())
        } else {
            let overlap = skill_overlap(query_skills, &candidate.profile.skills)?;
            (
                combine(overlap.percentage, semantic),
                overlap.matched,
                overlap.missing,
            )
        };

        results.push(SearchHit {
            id: candidate.id,
            name: candidate.profile.name.clone(),
            match_score,
            semantic_score: to_score(semantic),
            matched_skills,
            missing_skills,
        });
    }

    sort_and_truncate(&mut results, top_n, |h| h.match_score);
    Ok(Ranking { results, skipped })
}
