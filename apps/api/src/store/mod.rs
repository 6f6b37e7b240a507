//! Storage collaborator for candidates and job postings.
//!
//! The matching core only needs to list items that can be ranked and attach
//! embeddings after the fact. `PgMatchStore` backs production, and
//! `MemoryMatchStore` backs local runs without `DATABASE_URL` and tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::embedding::Embedding;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;

pub mod memory;
pub mod postgres;

pub use memory::MemoryMatchStore;
pub use postgres::PgMatchStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Every candidate that has some embedding attached, placeholders
    /// included. Insertion order.
    async fn list_candidates_with_embedding(&self) -> Result<Vec<CandidateProfile>, StoreError>;

    /// Every candidate, with or without an embedding. Insertion order.
    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, StoreError>;

    /// Candidates still waiting for an embedding. Insertion order.
    async fn list_candidates_without_embedding(&self)
        -> Result<Vec<CandidateProfile>, StoreError>;

    /// Active jobs that have some embedding attached. Insertion order.
    async fn list_active_jobs_with_embedding(&self) -> Result<Vec<JobPosting>, StoreError>;

    /// Active jobs still waiting for an embedding. Insertion order.
    async fn list_active_jobs_without_embedding(&self) -> Result<Vec<JobPosting>, StoreError>;

    /// Every job regardless of status. Insertion order.
    async fn list_jobs(&self) -> Result<Vec<JobPosting>, StoreError>;

    async fn get_candidate(&self, id: Uuid) -> Result<CandidateProfile, StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<JobPosting, StoreError>;

    async fn insert_candidate(&self, candidate: &CandidateProfile) -> Result<(), StoreError>;

    async fn insert_job(&self, job: &JobPosting) -> Result<(), StoreError>;

    async fn attach_candidate_embedding(
        &self,
        id: Uuid,
        embedding: &Embedding,
    ) -> Result<(), StoreError>;

    async fn attach_job_embedding(&self, id: Uuid, embedding: &Embedding)
        -> Result<(), StoreError>;
}
