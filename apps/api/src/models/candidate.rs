use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::embedding::Embedding;
use crate::parsing::profile::ParsedProfile;

/// A stored resume: parsed fields plus its (optional) embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub filename: Option<String>,
    pub profile: ParsedProfile,
    pub uploaded_at: DateTime<Utc>,
}

impl CandidateProfile {
    pub fn new(filename: Option<String>, profile: ParsedProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            profile,
            uploaded_at: Utc::now(),
        }
    }

    pub fn embedding(&self) -> Option<&Embedding> {
        self.profile.embedding()
    }

    pub fn set_embedding(&mut self, embedding: Embedding) {
        self.profile = std::mem::take(&mut self.profile).with_embedding(embedding);
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub filename: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub raw_text: String,
    pub word_count: i32,
    pub embedding: Option<Vec<f32>>,
    pub embedding_placeholder: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl From<CandidateRow> for CandidateProfile {
    fn from(row: CandidateRow) -> Self {
        let mut profile = ParsedProfile::default();
        profile.name = row.name;
        profile.email = row.email;
        profile.phone = row.phone;
        profile.skills = row.skills;
        profile.education = row.education;
        profile.raw_text = row.raw_text;
        profile.word_count = row.word_count.max(0) as usize;

        let profile = match row.embedding {
            Some(values) => {
                profile.with_embedding(Embedding::from_parts(values, row.embedding_placeholder))
            }
            None => profile,
        };

        CandidateProfile {
            id: row.id,
            filename: row.filename,
            profile,
            uploaded_at: row.uploaded_at,
        }
    }
}
