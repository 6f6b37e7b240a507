use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::{Embedding, EmbeddingStatus};
use crate::errors::AppError;
use crate::models::job::{JobPosting, JobStatus, NewJob};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub status: JobStatus,
    pub embedding: EmbeddingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&JobPosting> for JobResponse {
    fn from(job: &JobPosting) -> Self {
        JobResponse {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            description: job.description.clone(),
            required_skills: job.required_skills.clone(),
            status: job.status,
            embedding: Embedding::status(job.embedding.as_ref()),
            created_at: job.created_at,
        }
    }
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJob>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let mut job = req.into_posting();
    job.required_skills = job
        .required_skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    match state.embeddings.embed(&job.embedding_text()).await {
        Ok(embedding) => job.embedding = Some(embedding),
        Err(e) if e.is_unavailable() || e.is_rejected() => {
            warn!("Storing job {} without embedding: {e}", job.id);
        }
        Err(e) => return Err(e.into()),
    }

    state.store.insert_job(&job).await?;
    info!("Created job {} ({})", job.id, job.title);

    Ok((StatusCode::CREATED, Json(JobResponse::from(&job))))
}
