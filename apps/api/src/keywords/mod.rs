//! Keyword gap analysis and ATS scoring between two raw texts.
//!
//! Works directly on text, with no embeddings involved. Skill detection reuses
//! the profile parser so both sides agree on what counts as a skill.

pub mod analyzer;
pub mod ats;
pub mod handlers;
pub mod suggestions;
