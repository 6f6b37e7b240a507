//! Resume intake: uploaded files in, stored candidate profiles out.
//!
//! Each file succeeds or fails on its own. A corrupt or unsupported file is
//! reported in the import report and never aborts the rest of the batch.

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::embedding::EmbeddingStatus;
use crate::errors::AppError;
use crate::extraction::{check_size, Document, DocumentFormat, ExtractError};
use crate::parsing::profile::ProfileSummary;

pub mod handlers;
pub mod ingest;

pub const MAX_FILES_PER_IMPORT: usize = 10;

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// Resolves the declared format and enforces the size limit.
    pub fn into_document(self, max_bytes: usize) -> Result<Document, ExtractError> {
        let format =
            DocumentFormat::detect(self.content_type.as_deref(), self.filename.as_deref())?;
        let document = Document::new(self.bytes, format);
        check_size(&document, max_bytes)?;
        Ok(document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Imported,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub filename: Option<String>,
    pub status: ImportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProfileSummary>,
    /// Set when the file was imported but could not be embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl FileOutcome {
    pub fn failed(filename: Option<String>, error: &AppError) -> Self {
        Self {
            filename,
            status: ImportStatus::Failed,
            candidate_id: None,
            embedding: None,
            summary: None,
            warning: None,
            error: Some(ErrorBody {
                code: error.code(),
                message: error.public_message(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub files: Vec<FileOutcome>,
}

impl ImportReport {
    pub fn from_outcomes(files: Vec<FileOutcome>) -> Self {
        let imported = files
            .iter()
            .filter(|f| f.status == ImportStatus::Imported)
            .count();
        Self {
            imported,
            failed: files.len() - imported,
            files,
        }
    }
}
