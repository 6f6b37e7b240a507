use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{MatchStore, StoreError};
use crate::embedding::Embedding;
use crate::models::candidate::{CandidateProfile, CandidateRow};
use crate::models::job::{JobPosting, JobRow, JobStatus};

const CANDIDATE_COLUMNS: &str = "id, filename, name, email, phone, skills, education, raw_text, \
     word_count, embedding, embedding_placeholder, uploaded_at";

const JOB_COLUMNS: &str = "id, title, company, description, required_skills, status, \
     embedding, embedding_placeholder, created_at";

/// Postgres-backed store. Embeddings live in `REAL[]` columns next to a
/// placeholder flag.
#[derive(Clone)]
pub struct PgMatchStore {
    db: PgPool,
}

impl PgMatchStore {
    /// Opens the pool and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL...");

        let db = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        let store = Self { db };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

fn into_job(row: JobRow) -> Result<JobPosting, StoreError> {
    JobPosting::try_from(row).map_err(StoreError::InvalidRow)
}

fn word_count_column(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn list_candidates_with_embedding(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        let rows: Vec<CandidateRow> = sqlx::query_as(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE embedding IS NOT NULL ORDER BY seq"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CandidateProfile::from).collect())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        let rows: Vec<CandidateRow> =
            sqlx::query_as(&format!("SELECT {CANDIDATE_COLUMNS} FROM candidates ORDER BY seq"))
                .fetch_all(&self.db)
                .await?;

        Ok(rows.into_iter().map(CandidateProfile::from).collect())
    }

    async fn list_candidates_without_embedding(
        &self,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let rows: Vec<CandidateRow> = sqlx::query_as(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE embedding IS NULL ORDER BY seq"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CandidateProfile::from).collect())
    }

    async fn list_active_jobs_with_embedding(&self) -> Result<Vec<JobPosting>, StoreError> {
        let rows: Vec<JobRow> = sqlx::query_as(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = $1 AND embedding IS NOT NULL ORDER BY seq"
        ))
        .bind(JobStatus::Active.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(into_job).collect()
    }

    async fn list_active_jobs_without_embedding(&self) -> Result<Vec<JobPosting>, StoreError> {
        let rows: Vec<JobRow> = sqlx::query_as(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = $1 AND embedding IS NULL ORDER BY seq"
        ))
        .bind(JobStatus::Active.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(into_job).collect()
    }

    async fn list_jobs(&self) -> Result<Vec<JobPosting>, StoreError> {
        let rows: Vec<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY seq"))
                .fetch_all(&self.db)
                .await?;

        rows.into_iter().map(into_job).collect()
    }

    async fn get_candidate(&self, id: Uuid) -> Result<CandidateProfile, StoreError> {
        let row: Option<CandidateRow> = sqlx::query_as(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(CandidateProfile::from).ok_or(StoreError::NotFound {
            kind: "candidate",
            id,
        })
    }

    async fn get_job(&self, id: Uuid) -> Result<JobPosting, StoreError> {
        let row: Option<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        into_job(row.ok_or(StoreError::NotFound { kind: "job", id })?)
    }

    async fn insert_candidate(&self, candidate: &CandidateProfile) -> Result<(), StoreError> {
        let profile = &candidate.profile;
        let embedding = candidate.embedding();

        sqlx::query(
            r#"
            INSERT INTO candidates
                (id, filename, name, email, phone, skills, education, raw_text,
                 word_count, embedding, embedding_placeholder, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.filename)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.skills)
        .bind(&profile.education)
        .bind(&profile.raw_text)
        .bind(word_count_column(profile.word_count))
        .bind(embedding.map(|e| e.values().to_vec()))
        .bind(embedding.is_some_and(Embedding::is_placeholder))
        .bind(candidate.uploaded_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn insert_job(&self, job: &JobPosting) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, company, description, required_skills, status,
                 embedding, embedding_placeholder, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.required_skills)
        .bind(job.status.as_str())
        .bind(job.embedding.as_ref().map(|e| e.values().to_vec()))
        .bind(job.embedding.as_ref().is_some_and(Embedding::is_placeholder))
        .bind(job.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn attach_candidate_embedding(
        &self,
        id: Uuid,
        embedding: &Embedding,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE candidates SET embedding = $1, embedding_placeholder = $2 WHERE id = $3",
        )
        .bind(embedding.values())
        .bind(embedding.is_placeholder())
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: "candidate",
                id,
            });
        }
        Ok(())
    }

    async fn attach_job_embedding(
        &self,
        id: Uuid,
        embedding: &Embedding,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE jobs SET embedding = $1, embedding_placeholder = $2 WHERE id = $3")
                .bind(embedding.values())
                .bind(embedding.is_placeholder())
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind: "job", id });
        }
        Ok(())
    }
}
