//! Axum route handlers for resume upload.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::debug;

use super::ingest::import_batch;
use super::{ImportReport, Upload, MAX_FILES_PER_IMPORT};
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field names accepted as files.
const FILE_FIELDS: &[&str] = &["file", "files", "resume"];

/// POST /documents
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let is_file = field
            .name()
            .map(|name| FILE_FIELDS.contains(&name))
            .unwrap_or(false);
        if !is_file {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        if uploads.len() == MAX_FILES_PER_IMPORT {
            return Err(AppError::Validation(format!(
                "At most {MAX_FILES_PER_IMPORT} files per upload"
            )));
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        uploads.push(Upload {
            filename,
            content_type,
            bytes,
        });
    }

    if uploads.is_empty() {
        return Err(AppError::Validation(
            "No file uploaded. Send one or more 'file' parts.".to_string(),
        ));
    }

    Ok(Json(import_batch(&state, uploads).await))
}
