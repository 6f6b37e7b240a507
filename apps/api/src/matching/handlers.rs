//! Axum route handlers for the matching API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::filters::{
    explain_match, filter_by_experience, search_by_skills, ExperienceLevel, SearchStats,
    SkillSearchHit,
};
use super::ranking::{
    rank_candidates_for_job, rank_jobs_for_profile, search_candidates, SearchHit, SkipReason,
    SkippedItem,
};
use super::scorer::MatchResult;
use crate::analytics::MatchStats;
use crate::embedding::EmbeddingError;
use crate::errors::AppError;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::parsing::profile::extract_skills;
use crate::state::AppState;

pub const DEFAULT_TOP_N: usize = 10;
pub const MAX_TOP_N: usize = 100;
const MAX_SKILL_RESULTS: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query_text: String,
    #[serde(default)]
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub skipped: Vec<SkippedItem>,
    pub stats: SearchStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNQuery {
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RankedMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub explanation: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub results: Vec<RankedMatch>,
    pub skipped: Vec<SkippedItem>,
    pub stats: MatchStats,
}

impl RankResponse {
    fn new(results: Vec<MatchResult>, skipped: Vec<SkippedItem>) -> Self {
        let scores: Vec<u32> = results.iter().map(|r| r.match_score).collect();
        Self {
            stats: MatchStats::from_scores(&scores),
            results: ranked(results),
            skipped,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSearchRequest {
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillSearchResponse {
    pub results: Vec<SkillSearchHit>,
    pub total: usize,
}

fn resolve_top_n(top_n: Option<usize>) -> Result<usize, AppError> {
    match top_n.unwrap_or(DEFAULT_TOP_N) {
        0 => Err(AppError::Validation("topN must be at least 1".to_string())),
        n => Ok(n.min(MAX_TOP_N)),
    }
}

fn ranked(results: Vec<MatchResult>) -> Vec<RankedMatch> {
    results
        .into_iter()
        .map(|result| RankedMatch {
            explanation: explain_match(result.match_score),
            result,
        })
        .collect()
}

// Embedding backfill
// ────────────────────────────────────────────────────────────────────────────

/// Turns a failed embedding call into a skipped item. Only a dimension
/// mismatch is fatal for the whole ranking.
fn embedding_skip(id: Uuid, err: EmbeddingError) -> Result<SkippedItem, AppError> {
    let reason = if err.is_rejected() {
        SkipReason::EmbeddingRejected
    } else if err.is_unavailable() {
        SkipReason::EmbeddingUnavailable
    } else {
        return Err(err.into());
    };
    warn!("Could not embed {id}: {err}");
    Ok(SkippedItem::new(id, reason).with_detail(err.to_string()))
}

/// Embeds every stored candidate that has no vector yet, in one bounded
/// batch, and persists the results. Candidates the provider could not embed
/// come back as skipped items.
async fn backfill_candidate_embeddings(state: &AppState) -> Result<Vec<SkippedItem>, AppError> {
    let pending = state.store.list_candidates_without_embedding().await?;
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let texts = pending.iter().map(|c| c.profile.raw_text.clone()).collect();
    let results = state.embeddings.embed_batch(texts).await;

    let mut skipped = Vec::new();
    for (candidate, result) in pending.iter().zip(results) {
        match result {
            Ok(embedding) => {
                state
                    .store
                    .attach_candidate_embedding(candidate.id, &embedding)
                    .await?
            }
            Err(e) => skipped.push(embedding_skip(candidate.id, e)?),
        }
    }

    info!(
        "Backfilled {} of {} candidate embeddings",
        pending.len() - skipped.len(),
        pending.len()
    );
    Ok(skipped)
}

/// Same as `backfill_candidate_embeddings`, for active job postings.
async fn backfill_job_embeddings(state: &AppState) -> Result<Vec<SkippedItem>, AppError> {
    let pending = state.store.list_active_jobs_without_embedding().await?;
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let texts = pending.iter().map(JobPosting::embedding_text).collect();
    let results = state.embeddings.embed_batch(texts).await;

    let mut skipped = Vec::new();
    for (job, result) in pending.iter().zip(results) {
        match result {
            Ok(embedding) => state.store.attach_job_embedding(job.id, &embedding).await?,
            Err(e) => skipped.push(embedding_skip(job.id, e)?),
        }
    }

    info!(
        "Backfilled {} of {} job embeddings",
        pending.len() - skipped.len(),
        pending.len()
    );
    Ok(skipped)
}

/// Makes sure `job` carries a semantic embedding, embedding and persisting
/// it if needed. Placeholders are replaced.
async fn ensure_job_embedding(state: &AppState, job: &mut JobPosting) -> Result<(), AppError> {
    if job.embedding.as_ref().is_some_and(|e| !e.is_placeholder()) {
        return Ok(());
    }
    let embedding = state.embeddings.embed_strict(&job.embedding_text()).await?;
    state.store.attach_job_embedding(job.id, &embedding).await?;
    job.embedding = Some(embedding);
    Ok(())
}

async fn ensure_candidate_embedding(
    state: &AppState,
    candidate: &mut CandidateProfile,
) -> Result<(), AppError> {
    if candidate.embedding().is_some_and(|e| !e.is_placeholder()) {
        return Ok(());
    }
    let embedding = state
        .embeddings
        .embed_strict(&candidate.profile.raw_text)
        .await?;
    state
        .store
        .attach_candidate_embedding(candidate.id, &embedding)
        .await?;
    candidate.set_embedding(embedding);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /match/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if req.query_text.trim().is_empty() {
        return Err(AppError::Validation("queryText is required".to_string()));
    }
    let top_n = resolve_top_n(req.top_n)?;

    // A placeholder query would rank on noise, so never degrade here.
    let query = state.embeddings.embed_strict(&req.query_text).await?;
    let query_skills = extract_skills(&req.query_text, &state.vocabulary);

    let mut skipped = backfill_candidate_embeddings(&state).await?;
    let candidates = state.store.list_candidates_with_embedding().await?;
    let ranking = search_candidates(
        &query,
        &query_skills,
        &candidates,
        top_n,
        state.config.search_candidate_pool,
    )?;

    skipped.extend(ranking.skipped);

    let scores: Vec<u32> = ranking.results.iter().map(|h| h.match_score).collect();
    info!(
        "Search returned {} results ({} skipped)",
        ranking.results.len(),
        skipped.len()
    );

    Ok(Json(SearchResponse {
        stats: SearchStats::from_scores(&scores),
        results: ranking.results,
        skipped,
    }))
}

/// GET /match/jobs/:id/candidates
pub async fn handle_candidates_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<TopNQuery>,
) -> Result<Json<RankResponse>, AppError> {
    let top_n = resolve_top_n(params.top_n)?;

    let mut job = state.store.get_job(job_id).await?;
    if job.required_skills.is_empty() {
        return Err(AppError::InvalidArgument(format!(
            "job {job_id} has no required skills"
        )));
    }
    ensure_job_embedding(&state, &mut job).await?;

    let mut skipped = backfill_candidate_embeddings(&state).await?;
    let candidates = state.store.list_candidates_with_embedding().await?;

    let ranking = rank_candidates_for_job(&job, &candidates, top_n)?;
    skipped.extend(ranking.skipped);

    Ok(Json(RankResponse::new(ranking.results, skipped)))
}

/// GET /match/candidates/:id/jobs
pub async fn handle_jobs_for_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(params): Query<TopNQuery>,
) -> Result<Json<RankResponse>, AppError> {
    let top_n = resolve_top_n(params.top_n)?;

    let mut candidate = state.store.get_candidate(candidate_id).await?;
    ensure_candidate_embedding(&state, &mut candidate).await?;

    let mut skipped = backfill_job_embeddings(&state).await?;
    let jobs = state.store.list_active_jobs_with_embedding().await?;

    let ranking = rank_jobs_for_profile(&candidate, &jobs, top_n)?;
    skipped.extend(ranking.skipped);

    Ok(Json(RankResponse::new(ranking.results, skipped)))
}

/// POST /match/skills
pub async fn handle_skill_search(
    State(state): State<AppState>,
    Json(req): Json<SkillSearchRequest>,
) -> Result<Json<SkillSearchResponse>, AppError> {
    let level = req
        .experience_level
        .as_deref()
        .map(str::parse::<ExperienceLevel>)
        .transpose()?;
    let candidates = state.store.list_candidates().await?;

    let mut results = match level {
        Some(level) => search_by_skills(
            &req.required_skills,
            filter_by_experience(level, &candidates),
        )?,
        None => search_by_skills(&req.required_skills, &candidates)?,
    };

    let total = results.len();
    results.truncate(MAX_SKILL_RESULTS);

    Ok(Json(SkillSearchResponse { results, total }))
}
