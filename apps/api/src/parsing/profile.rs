use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::embedding::Embedding;
use crate::parsing::vocabulary::Vocabulary;

pub const UNKNOWN_NAME: &str = "Unknown";
/// First lines at least this long are treated as header noise, not a name.
const MAX_NAME_CHARS: usize = 50;
const SUMMARY_TOP_SKILLS: usize = 5;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+?[0-9]{1,3}[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}")
        .expect("valid phone regex")
});

/// Structured facts derived from one resume's text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProfile {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Lowercased, deduplicated, vocabulary order.
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub raw_text: String,
    pub word_count: usize,
    embedding: Option<Embedding>,
}

impl Default for ParsedProfile {
    fn default() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            email: None,
            phone: None,
            skills: Vec::new(),
            education: Vec::new(),
            raw_text: String::new(),
            word_count: 0,
            embedding: None,
        }
    }
}

impl ParsedProfile {
    /// The only mutation allowed after parsing.
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn embedding(&self) -> Option<&Embedding> {
        self.embedding.as_ref()
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            skill_count: self.skills.len(),
            top_skills: self
                .skills
                .iter()
                .take(SUMMARY_TOP_SKILLS)
                .cloned()
                .collect(),
            education_count: self.education.len(),
            word_count: self.word_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skill_count: usize,
    pub top_skills: Vec<String>,
    pub education_count: usize,
    pub word_count: usize,
}

/// Parses resume text into a `ParsedProfile`. Total over all inputs.
pub fn parse_profile(text: &str, vocabulary: &Vocabulary) -> ParsedProfile {
    ParsedProfile {
        name: extract_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
        skills: extract_skills(text, vocabulary),
        education: extract_education(text, vocabulary),
        raw_text: text.to_string(),
        word_count: text.split_whitespace().count(),
        embedding: None,
    }
}

/// First non-empty line, unless it is too long to plausibly be a name.
pub fn extract_name(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| line.chars().count() < MAX_NAME_CHARS)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Vocabulary skills mentioned anywhere in the text (case-insensitive
/// substring), lowercased and reported in vocabulary order.
pub fn extract_skills(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut skills: Vec<String> = Vec::new();

    for skill in &vocabulary.skills {
        let skill_lower = skill.to_lowercase();
        if text_lower.contains(&skill_lower) && !skills.contains(&skill_lower) {
            skills.push(skill_lower);
        }
    }

    skills
}

/// Trimmed lines containing a degree keyword, first-seen order, no repeats.
pub fn extract_education(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let mut education: Vec<String> = Vec::new();

    for line in text.lines() {
        let has_degree = vocabulary
            .degree_keywords
            .iter()
            .any(|degree| line.contains(degree.as_str()));
        let line = line.trim();
        if has_degree && !education.iter().any(|e| e == line) {
            education.push(line.to_string());
        }
    }

    education
}
