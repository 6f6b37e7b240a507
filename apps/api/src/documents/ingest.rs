use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::{FileOutcome, ImportReport, ImportStatus, Upload};
use crate::embedding::pool::EmbeddingPool;
use crate::embedding::Embedding;
use crate::errors::AppError;
use crate::extraction::{extract_text, Document};
use crate::models::candidate::CandidateProfile;
use crate::parsing::profile::{parse_profile, ParsedProfile};
use crate::parsing::vocabulary::Vocabulary;
use crate::state::AppState;

/// A parsed document, embedded if the provider allowed it.
#[derive(Debug)]
pub struct Ingested {
    pub profile: ParsedProfile,
    /// Why the profile has no embedding, when it has none.
    pub embedding_error: Option<String>,
}

/// Extraction and parsing on the blocking pool. Both are CPU-bound and PDF
/// decoding can take a while on large files.
pub async fn extract_profile(
    document: Document,
    vocabulary: Arc<Vocabulary>,
) -> Result<ParsedProfile, AppError> {
    tokio::task::spawn_blocking(move || -> Result<ParsedProfile, AppError> {
        let text = extract_text(&document)?;
        Ok(parse_profile(&text, &vocabulary))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))?
}

/// Extract, parse, then embed one document.
///
/// An unavailable provider leaves the profile unembedded (or with a
/// placeholder in degraded mode), as does a provider that rejects the text.
/// A dimension mismatch fails the document.
pub async fn ingest_document(
    document: Document,
    vocabulary: Arc<Vocabulary>,
    pool: EmbeddingPool,
) -> Result<Ingested, AppError> {
    let profile = extract_profile(document, vocabulary).await?;

    match pool.embed(&profile.raw_text).await {
        Ok(embedding) => Ok(Ingested {
            profile: profile.with_embedding(embedding),
            embedding_error: None,
        }),
        Err(e) if e.is_unavailable() || e.is_rejected() => {
            warn!("Storing profile without embedding: {e}");
            Ok(Ingested {
                profile,
                embedding_error: Some(e.to_string()),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Processes every upload independently and stores the ones that parse.
/// Documents run concurrently; embedding calls share the pool's permits.
/// Outcomes come back in upload order.
pub async fn import_batch(state: &AppState, uploads: Vec<Upload>) -> ImportReport {
    let total = uploads.len();
    let mut tasks = JoinSet::new();

    for (index, upload) in uploads.into_iter().enumerate() {
        let filename = upload.filename.clone();
        let max_bytes = state.config.max_upload_bytes;
        let vocabulary = state.vocabulary.clone();
        let pool = state.embeddings.clone();

        tasks.spawn(async move {
            let result = match upload.into_document(max_bytes) {
                Ok(document) => ingest_document(document, vocabulary, pool).await,
                Err(e) => Err(AppError::from(e)),
            };
            (index, filename, result)
        });
    }

    let mut finished: Vec<Option<(Option<String>, Result<Ingested, AppError>)>> =
        (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, filename, result)) => finished[index] = Some((filename, result)),
            Err(e) => warn!("Import task failed to complete: {e}"),
        }
    }

    let mut outcomes = Vec::with_capacity(total);
    for slot in finished {
        let Some((filename, result)) = slot else {
            outcomes.push(FileOutcome::failed(
                None,
                &AppError::Internal(anyhow!("import task did not complete")),
            ));
            continue;
        };

        let outcome = match result {
            Ok(ingested) => store_candidate(state, filename.clone(), ingested)
                .await
                .unwrap_or_else(|e| FileOutcome::failed(filename, &e)),
            Err(e) => {
                warn!("Failed to import {}: {e}", filename.as_deref().unwrap_or("<unnamed>"));
                FileOutcome::failed(filename, &e)
            }
        };
        outcomes.push(outcome);
    }

    let report = ImportReport::from_outcomes(outcomes);
    info!(
        "Imported {} of {} documents ({} failed)",
        report.imported, total, report.failed
    );
    report
}

async fn store_candidate(
    state: &AppState,
    filename: Option<String>,
    ingested: Ingested,
) -> Result<FileOutcome, AppError> {
    let candidate = CandidateProfile::new(filename.clone(), ingested.profile);
    state.store.insert_candidate(&candidate).await?;

    Ok(FileOutcome {
        filename,
        status: ImportStatus::Imported,
        candidate_id: Some(candidate.id),
        embedding: Some(Embedding::status(candidate.embedding())),
        summary: Some(candidate.profile.summary()),
        warning: ingested
            .embedding_error
            .map(|e| format!("Imported without embedding: {e}")),
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::{DownEmbedder, HashingEmbedder, WrongDimensionEmbedder};
    use crate::embedding::EmbeddingStatus;
    use crate::extraction::docx::build_docx;
    use crate::extraction::MIME_DOCX;
    use bytes::Bytes;

    fn docx_upload(name: &str, paragraphs: &[&str]) -> Upload {
        Upload {
            filename: Some(name.to_string()),
            content_type: Some(MIME_DOCX.to_string()),
            bytes: Bytes::from(build_docx(paragraphs)),
        }
    }

    fn text_upload(name: &str) -> Upload {
        Upload {
            filename: Some(name.to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from_static(b"plain text resume"),
        }
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let state = AppState::for_tests(Arc::new(HashingEmbedder), false);
        let uploads = vec![
            docx_upload("jane.docx", &["Jane Doe", "Python and Docker engineer"]),
            text_upload("notes.txt"),
            Upload {
                filename: Some("empty.pdf".to_string()),
                content_type: Some("application/pdf".to_string()),
                bytes: Bytes::new(),
            },
        ];

        let report = import_batch(&state, uploads).await;

        assert_eq!(report.imported, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.files[0].status, ImportStatus::Imported);
        assert_eq!(report.files[0].embedding, Some(EmbeddingStatus::Semantic));
        let summary = report.files[0].summary.as_ref().unwrap();
        assert_eq!(summary.name, "Jane Doe");
        assert_eq!(summary.top_skills, vec!["python", "docker"]);

        assert_eq!(report.files[1].error.as_ref().unwrap().code, "UNSUPPORTED_FORMAT");
        assert_eq!(report.files[2].error.as_ref().unwrap().code, "EMPTY_INPUT");

        let stored = state.store.list_candidates_with_embedding().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(Some(stored[0].id), report.files[0].candidate_id);
    }

    #[tokio::test]
    async fn test_unavailable_embedding_still_imports() {
        let state = AppState::for_tests(Arc::new(DownEmbedder), false);
        let report = import_batch(&state, vec![docx_upload("a.docx", &["Ann", "Rust"])]).await;

        assert_eq!(report.imported, 1);
        assert_eq!(report.files[0].embedding, Some(EmbeddingStatus::Missing));
        assert!(report.files[0].warning.is_some());
        assert!(state
            .store
            .list_candidates_with_embedding()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_degraded_mode_stores_placeholder() {
        let state = AppState::for_tests(Arc::new(DownEmbedder), true);
        let report = import_batch(&state, vec![docx_upload("a.docx", &["Ann", "Rust"])]).await;

        assert_eq!(report.files[0].embedding, Some(EmbeddingStatus::Placeholder));
        assert!(report.files[0].warning.is_none());
    }

    #[tokio::test]
    async fn test_rejected_text_is_stored_without_placeholder() {
        let state = AppState::for_tests(Arc::new(HashingEmbedder), true);
        let report = import_batch(
            &state,
            vec![docx_upload("long.docx", &["Ann", "Rust REJECT_EMBEDDING"])],
        )
        .await;

        assert_eq!(report.imported, 1);
        assert_eq!(report.files[0].embedding, Some(EmbeddingStatus::Missing));
        assert!(report.files[0].warning.is_some());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_the_file() {
        let state = AppState::for_tests(Arc::new(WrongDimensionEmbedder), true);
        let report = import_batch(&state, vec![docx_upload("a.docx", &["Ann"])]).await;

        assert_eq!(report.failed, 1);
        assert_eq!(
            report.files[0].error.as_ref().unwrap().code,
            "DIMENSION_MISMATCH"
        );
    }
}
