use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::embedding::Embedding;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    #[default]
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// A job posting as read by the matching core. Created and edited elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub status: JobStatus,
    pub embedding: Option<Embedding>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    /// Text fed to the embedding service for this posting.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description,
            self.required_skills.join(" ")
        )
    }
}

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
}

impl NewJob {
    pub fn into_posting(self) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: self.title,
            company: self.company,
            description: self.description,
            required_skills: self.required_skills,
            status: self.status,
            embedding: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub status: String,
    pub embedding: Option<Vec<f32>>,
    pub embedding_placeholder: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobPosting {
    type Error = String;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(JobPosting {
            id: row.id,
            title: row.title,
            company: row.company,
            description: row.description,
            required_skills: row.required_skills,
            status: row.status.parse()?,
            embedding: row
                .embedding
                .map(|values| Embedding::from_parts(values, row.embedding_placeholder)),
            created_at: row.created_at,
        })
    }
}
