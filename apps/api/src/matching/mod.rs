//! Matching core: vector similarity, skill overlap and the composite score.
//!
//! All functions here are pure and CPU-bound. Errors indicate caller bugs
//! (mismatched dimensions, violated preconditions) and are never retried.

use thiserror::Error;

pub mod filters;
pub mod handlers;
pub mod ranking;
pub mod scorer;
pub mod similarity;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("Vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
