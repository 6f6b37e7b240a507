//! Axum route handlers for keyword and ATS analysis.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::analyzer::{analyze, KeywordAnalysis};
use super::ats::{report_from_analysis, AtsReport};
use super::suggestions::{optimization_suggestions, placement_suggestions, PlacementSuggestion};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRequest {
    pub resume_text: String,
    pub job_text: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordResponse {
    pub analysis: KeywordAnalysis,
    pub ats: AtsReport,
    pub suggestions: Vec<String>,
    pub placements: Vec<PlacementSuggestion>,
}

/// POST /match/keywords
pub async fn handle_keywords(
    State(state): State<AppState>,
    Json(req): Json<KeywordRequest>,
) -> Result<Json<KeywordResponse>, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resumeText is required".to_string()));
    }
    if req.job_text.trim().is_empty() {
        return Err(AppError::Validation("jobText is required".to_string()));
    }

    let analysis = analyze(&req.resume_text, &req.job_text, &state.vocabulary);
    let ats = report_from_analysis(&req.resume_text, &analysis);

    Ok(Json(KeywordResponse {
        suggestions: optimization_suggestions(&analysis),
        placements: placement_suggestions(&analysis.missing_keywords),
        analysis,
        ats,
    }))
}
