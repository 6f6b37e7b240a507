use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::extraction::ExtractError;
use crate::matching::ScoringError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Embedding error: {0}")]
    Embedding(EmbeddingError),

    #[error("Embedding rejected: {0}")]
    EmbeddingRejected(EmbeddingError),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<EmbeddingError> for AppError {
    fn from(e: EmbeddingError) -> Self {
        match e {
            EmbeddingError::DimensionMismatch { expected, actual } => {
                AppError::DimensionMismatch { expected, actual }
            }
            rejected if rejected.is_rejected() => AppError::EmbeddingRejected(rejected),
            other => AppError::Embedding(other),
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::DimensionMismatch { left, right } => AppError::DimensionMismatch {
                expected: left,
                actual: right,
            },
            ScoringError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => AppError::NotFound(format!("{kind} {id} not found")),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    /// Stable machine-readable code, also used in per-file import outcomes.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Extract(ExtractError::UnsupportedFormat(_)) => "UNSUPPORTED_FORMAT",
            AppError::Extract(ExtractError::EmptyInput) => "EMPTY_INPUT",
            AppError::Extract(ExtractError::TooLarge { .. }) => "FILE_TOO_LARGE",
            AppError::Extract(ExtractError::Extraction { .. }) => "EXTRACTION_FAILED",
            AppError::Embedding(_) => "EMBEDDING_UNAVAILABLE",
            AppError::EmbeddingRejected(_) => "EMBEDDING_REJECTED",
            AppError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            AppError::Store(_) => "DATABASE_ERROR",
            AppError::Multipart(_) => "INVALID_MULTIPART",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidArgument(_) | AppError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Extract(ExtractError::UnsupportedFormat(_) | ExtractError::EmptyInput) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Extract(ExtractError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extract(ExtractError::Extraction { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Embedding(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EmbeddingRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DimensionMismatch { .. } | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Server-side failures are logged here and
    /// replaced with a generic sentence.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Embedding(e) => {
                tracing::warn!("Embedding unavailable: {e}");
                "The embedding service is unavailable, try again later".to_string()
            }
            AppError::EmbeddingRejected(e) => {
                tracing::warn!("Embedding rejected: {e}");
                "The embedding service rejected this text".to_string()
            }
            AppError::DimensionMismatch { .. } => {
                tracing::error!("{self}");
                "Embedding dimension does not match the configured dimension".to_string()
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::InvalidArgument(msg) => {
                msg.clone()
            }
            AppError::Extract(e) => e.to_string(),
            AppError::Multipart(e) => e.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_document_errors_are_client_errors() {
        let unsupported: AppError = ExtractError::UnsupportedFormat("text/plain".into()).into();
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unsupported.code(), "UNSUPPORTED_FORMAT");

        let empty: AppError = ExtractError::EmptyInput.into();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let big: AppError = ExtractError::TooLarge { size: 2, limit: 1 }.into();
        assert_eq!(big.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_embedding_dimension_mismatch_is_fatal() {
        let e: AppError = EmbeddingError::DimensionMismatch {
            expected: 1536,
            actual: 768,
        }
        .into();
        assert!(matches!(e, AppError::DimensionMismatch { .. }));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_embedding_unavailable_is_503() {
        let e: AppError = EmbeddingError::NotConfigured.into();
        assert_eq!(e.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.code(), "EMBEDDING_UNAVAILABLE");
    }

    #[test]
    fn test_rejected_input_is_422() {
        let e: AppError = EmbeddingError::Api {
            status: 400,
            message: "too many tokens".into(),
        }
        .into();
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code(), "EMBEDDING_REJECTED");

        let e: AppError = EmbeddingError::Api {
            status: 429,
            message: "slow down".into(),
        }
        .into();
        assert_eq!(e.code(), "EMBEDDING_UNAVAILABLE");
    }

    #[test]
    fn test_scoring_and_store_mapping() {
        let e: AppError = ScoringError::InvalidArgument("empty".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);

        let e: AppError = StoreError::NotFound {
            kind: "job",
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }
}
