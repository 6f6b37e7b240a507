use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MatchStore, StoreError};
use crate::embedding::Embedding;
use crate::models::candidate::CandidateProfile;
use crate::models::job::{JobPosting, JobStatus};

/// In-process store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryMatchStore {
    candidates: RwLock<Vec<CandidateProfile>>,
    jobs: RwLock<Vec<JobPosting>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn list_candidates_with_embedding(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        let candidates = self.candidates.read().await;
        Ok(candidates
            .iter()
            .filter(|c| c.embedding().is_some())
            .cloned()
            .collect())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        Ok(self.candidates.read().await.clone())
    }

    async fn list_candidates_without_embedding(
        &self,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let candidates = self.candidates.read().await;
        Ok(candidates
            .iter()
            .filter(|c| c.embedding().is_none())
            .cloned()
            .collect())
    }

    async fn list_active_jobs_with_embedding(&self) -> Result<Vec<JobPosting>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active && j.embedding.is_some())
            .cloned()
            .collect())
    }

    async fn list_active_jobs_without_embedding(&self) -> Result<Vec<JobPosting>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active && j.embedding.is_none())
            .cloned()
            .collect())
    }

    async fn list_jobs(&self) -> Result<Vec<JobPosting>, StoreError> {
        Ok(self.jobs.read().await.clone())
    }

    async fn get_candidate(&self, id: Uuid) -> Result<CandidateProfile, StoreError> {
        self.candidates
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "candidate",
                id,
            })
    }

    async fn get_job(&self, id: Uuid) -> Result<JobPosting, StoreError> {
        self.jobs
            .read()
            .await
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "job", id })
    }

    async fn insert_candidate(&self, candidate: &CandidateProfile) -> Result<(), StoreError> {
        self.candidates.write().await.push(candidate.clone());
        Ok(())
    }

    async fn insert_job(&self, job: &JobPosting) -> Result<(), StoreError> {
        self.jobs.write().await.push(job.clone());
        Ok(())
    }

    async fn attach_candidate_embedding(
        &self,
        id: Uuid,
        embedding: &Embedding,
    ) -> Result<(), StoreError> {
        let mut candidates = self.candidates.write().await;
        let candidate = candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound {
                kind: "candidate",
                id,
            })?;
        candidate.set_embedding(embedding.clone());
        Ok(())
    }

    async fn attach_job_embedding(
        &self,
        id: Uuid,
        embedding: &Embedding,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound { kind: "job", id })?;
        job.embedding = Some(embedding.clone());
        Ok(())
    }
}
