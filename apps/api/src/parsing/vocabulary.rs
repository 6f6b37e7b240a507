//! Versioned vocabularies driving the parser and the keyword analyzer.
//!
//! Passed explicitly into every function that needs them so alternate
//! vocabularies can be swapped in via `VOCABULARY_PATH` or in tests.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_VERSION: &str = "2024.1";

const DEFAULT_SKILLS: &[&str] = &[
    "JavaScript",
    "Python",
    "Java",
    "C++",
    "React",
    "Node.js",
    "Angular",
    "Vue.js",
    "MongoDB",
    "MySQL",
    "PostgreSQL",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "GCP",
    "Git",
    "TypeScript",
    "HTML",
    "CSS",
    "Redux",
    "Express",
    "Django",
    "Flask",
    "TensorFlow",
    "PyTorch",
    "Machine Learning",
    "AI",
    "Data Science",
    "Agile",
    "Scrum",
    "REST API",
    "GraphQL",
    "SQL",
    "NoSQL",
    "Redis",
    "CI/CD",
    "Jenkins",
];

const DEFAULT_DEGREE_KEYWORDS: &[&str] = &[
    "Bachelor", "Master", "PhD", "B.S.", "M.S.", "B.Tech", "M.Tech", "MBA",
];

const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "should", "could", "may", "might", "must", "can", "this", "that",
    "these", "those",
];

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse vocabulary file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Vocabulary '{version}' has an empty {field} list")]
    Empty {
        version: String,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub version: String,
    /// Known skill names, in the order they are reported.
    pub skills: Vec<String>,
    /// Case-sensitive markers of an education line.
    pub degree_keywords: Vec<String>,
    /// Lowercase words never counted as keywords.
    pub stop_words: HashSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            degree_keywords: DEFAULT_DEGREE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Vocabulary {
    /// Loads a vocabulary from a JSON file.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let content = std::fs::read_to_string(path)?;
        let mut vocabulary: Vocabulary = serde_json::from_str(&content)?;

        if vocabulary.skills.is_empty() {
            return Err(VocabularyError::Empty {
                version: vocabulary.version,
                field: "skills",
            });
        }

        vocabulary.stop_words = vocabulary
            .stop_words
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();

        Ok(vocabulary)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}
