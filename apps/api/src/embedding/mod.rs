//! Embeddings: the only part of the pipeline that leaves the process.
//!
//! `VectorProvider` is the seam to the external embedding service. Everything
//! else goes through `EmbeddingPool`, which bounds concurrency, applies the
//! per-call timeout and decides whether a failure may degrade to a placeholder.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod client;
pub mod pool;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider returned no embedding")]
    EmptyResponse,

    #[error("Embedding request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Embedding request was cancelled")]
    Cancelled,

    /// Deployment misconfiguration; never degraded, never retried.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// The provider refused this particular input. Sending the same text
    /// again will fail the same way, so it is neither retried nor degraded.
    pub fn is_rejected(&self) -> bool {
        matches!(self, EmbeddingError::Api { status: 400 | 413 | 422, .. })
    }

    /// The service could not give us a vector right now. Everything except a
    /// dimension mismatch or a rejected input.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, EmbeddingError::DimensionMismatch { .. }) && !self.is_rejected()
    }
}

/// Whether a stored vector carries semantic content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbeddingStatus {
    Semantic,
    Placeholder,
    Missing,
}

/// A fixed-dimension embedding vector.
///
/// Placeholders are zero vectors substituted in degraded mode. They keep the
/// dimension invariant but are excluded from every ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    values: Vec<f32>,
    placeholder: bool,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            placeholder: false,
        }
    }

    pub fn placeholder(dimension: usize) -> Self {
        Self {
            values: vec![0.0; dimension],
            placeholder: true,
        }
    }

    pub fn from_parts(values: Vec<f32>, placeholder: bool) -> Self {
        Self {
            values,
            placeholder,
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn status(embedding: Option<&Embedding>) -> EmbeddingStatus {
        match embedding {
            Some(e) if e.placeholder => EmbeddingStatus::Placeholder,
            Some(_) => EmbeddingStatus::Semantic,
            None => EmbeddingStatus::Missing,
        }
    }
}

/// External embedding service. Implementations may block on network I/O.
#[async_trait]
pub trait VectorProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Process-wide vector dimension D.
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_zero_and_flagged() {
        let e = Embedding::placeholder(4);
        assert_eq!(e.values(), &[0.0, 0.0, 0.0, 0.0]);
        assert!(e.is_placeholder());
        assert_eq!(Embedding::status(Some(&e)), EmbeddingStatus::Placeholder);
    }

    #[test]
    fn test_status() {
        assert_eq!(Embedding::status(None), EmbeddingStatus::Missing);
        assert_eq!(
            Embedding::status(Some(&Embedding::new(vec![0.5]))),
            EmbeddingStatus::Semantic
        );
    }

    #[test]
    fn test_dimension_mismatch_is_not_unavailability() {
        let err = EmbeddingError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(!err.is_unavailable());
        assert!(EmbeddingError::Timeout(Duration::from_secs(1)).is_unavailable());
        assert!(EmbeddingError::NotConfigured.is_unavailable());
    }

    #[test]
    fn test_input_rejection_is_permanent() {
        let too_long = EmbeddingError::Api {
            status: 400,
            message: "maximum context length exceeded".to_string(),
        };
        assert!(too_long.is_rejected());
        assert!(!too_long.is_unavailable());

        for status in [401, 429, 500, 503] {
            let err = EmbeddingError::Api {
                status,
                message: String::new(),
            };
            assert!(!err.is_rejected(), "status {status}");
            assert!(err.is_unavailable(), "status {status}");
        }
    }
}
