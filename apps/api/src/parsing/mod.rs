//! Structured profile extraction from plain resume text.
//!
//! Everything here is pure and deterministic. The heuristics are best-effort:
//! a resume whose first line is a long header gets the name "Unknown", skill
//! matching is substring-based ("Java" also fires on "JavaScript"), and any
//! line mentioning a degree keyword counts as education.

pub mod profile;
pub mod vocabulary;
