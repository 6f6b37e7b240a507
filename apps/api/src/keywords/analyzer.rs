use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::matching::scorer::to_score;
use crate::parsing::profile::extract_skills;
use crate::parsing::vocabulary::Vocabulary;

pub const MAX_KEYWORDS: usize = 30;
pub const MAX_MISSING_KEYWORDS: usize = 15;
/// Tokens this short or shorter are never keywords.
const MIN_KEYWORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordAnalysis {
    pub matched_keywords: Vec<String>,
    /// First `MAX_MISSING_KEYWORDS` only.
    pub missing_keywords: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub match_score: u32,
    pub total_job_keywords: usize,
    pub total_matched_keywords: usize,
}

/// Lowercases, blanks out everything but ASCII word characters and
/// whitespace, and drops short tokens and stop words.
fn tokenize(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|token| !vocabulary.is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// The `MAX_KEYWORDS` most frequent tokens. Equal counts keep first-seen order.
pub fn extract_keywords(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for token in tokenize(text, vocabulary) {
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among ties
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(MAX_KEYWORDS);
    order
}

/// Compares a resume against a job description.
pub fn analyze(resume_text: &str, job_text: &str, vocabulary: &Vocabulary) -> KeywordAnalysis {
    let resume_keywords: HashSet<String> =
        extract_keywords(resume_text, vocabulary).into_iter().collect();
    let job_keywords = extract_keywords(job_text, vocabulary);

    let (matched_keywords, mut missing_keywords): (Vec<String>, Vec<String>) = job_keywords
        .iter()
        .cloned()
        .partition(|kw| resume_keywords.contains(kw));
    missing_keywords.truncate(MAX_MISSING_KEYWORDS);

    let resume_skills = extract_skills(resume_text, vocabulary);
    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) =
        extract_skills(job_text, vocabulary)
            .into_iter()
            .partition(|skill| resume_skills.contains(skill));

    let total_job_keywords = job_keywords.len();
    let match_score = if total_job_keywords == 0 {
        0
    } else {
        to_score(matched_keywords.len() as f64 / total_job_keywords as f64 * 100.0)
    };

    KeywordAnalysis {
        total_matched_keywords: matched_keywords.len(),
        matched_keywords,
        missing_keywords,
        matched_skills,
        missing_skills,
        match_score,
        total_job_keywords,
    }
}
