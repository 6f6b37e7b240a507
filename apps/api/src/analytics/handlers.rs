//! Axum route handlers for the dashboard.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{
    comprehensive, education_distribution, job_stats, overview, submission_trend, top_skills,
    Analytics, DailyCount, DashboardOverview, EducationShare, JobStats, SkillCount,
    DEFAULT_TOP_SKILLS, DEFAULT_TREND_DAYS, MAX_TOP_SKILLS, MAX_TREND_DAYS,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSkillsResponse {
    pub top_skills: Vec<SkillCount>,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub trend: Vec<DailyCount>,
    pub days: u64,
}

#[derive(Debug, Serialize)]
pub struct EducationResponse {
    pub distribution: Vec<EducationShare>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /dashboard/stats
pub async fn handle_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardOverview>, AppError> {
    let candidates = state.store.list_candidates().await?;
    let jobs = state.store.list_jobs().await?;
    Ok(Json(overview(&candidates, &jobs, Utc::now())))
}

/// GET /dashboard/top-skills?limit=
pub async fn handle_top_skills(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<TopSkillsResponse>, AppError> {
    let limit = match params.limit.unwrap_or(DEFAULT_TOP_SKILLS) {
        0 => return Err(AppError::Validation("limit must be at least 1".to_string())),
        n => n.min(MAX_TOP_SKILLS),
    };

    let candidates = state.store.list_candidates().await?;
    Ok(Json(TopSkillsResponse {
        top_skills: top_skills(&candidates, limit),
    }))
}

/// GET /dashboard/submission-trend?days=
pub async fn handle_submission_trend(
    State(state): State<AppState>,
    Query(params): Query<DaysQuery>,
) -> Result<Json<TrendResponse>, AppError> {
    let days = match params.days.unwrap_or(DEFAULT_TREND_DAYS) {
        0 => return Err(AppError::Validation("days must be at least 1".to_string())),
        n => n.min(MAX_TREND_DAYS),
    };

    let candidates = state.store.list_candidates().await?;
    Ok(Json(TrendResponse {
        trend: submission_trend(&candidates, days, Utc::now().date_naive()),
        days,
    }))
}

/// GET /dashboard/job-stats
pub async fn handle_job_stats(State(state): State<AppState>) -> Result<Json<JobStats>, AppError> {
    let jobs = state.store.list_jobs().await?;
    Ok(Json(job_stats(&jobs)))
}

/// GET /dashboard/education-distribution
pub async fn handle_education_distribution(
    State(state): State<AppState>,
) -> Result<Json<EducationResponse>, AppError> {
    let candidates = state.store.list_candidates().await?;
    Ok(Json(EducationResponse {
        distribution: education_distribution(&candidates),
    }))
}

/// GET /dashboard/analytics
pub async fn handle_analytics(State(state): State<AppState>) -> Result<Json<Analytics>, AppError> {
    let candidates = state.store.list_candidates().await?;
    let jobs = state.store.list_jobs().await?;
    Ok(Json(comprehensive(&candidates, &jobs, Utc::now())))
}
