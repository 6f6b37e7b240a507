//! ATS (applicant tracking system) score: how well a resume is likely to
//! survive automated screening for a given job description.
//!
//! overallScore = round(0.5 × keywordScore + 0.3 × skillScore + 0.2 × formattingScore)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::analyzer::{analyze, KeywordAnalysis};
use crate::matching::scorer::to_score;
use crate::parsing::profile::{extract_email, extract_phone};
use crate::parsing::vocabulary::Vocabulary;

const KEYWORD_WEIGHT: f64 = 0.5;
const SKILL_WEIGHT: f64 = 0.3;
const FORMATTING_WEIGHT: f64 = 0.2;

const EMAIL_POINTS: u32 = 33;
const PHONE_POINTS: u32 = 33;
const SECTIONS_POINTS: u32 = 34;

// Whole words only: "Experienced" is not an experience section.
static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(experience|education|skills)\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Lower bound of each band is inclusive.
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsFactors {
    pub has_email: bool,
    pub has_phone: bool,
    pub has_standard_sections: bool,
    pub keyword_match: u32,
    pub skill_match: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsReport {
    pub overall_score: u32,
    pub keyword_score: u32,
    pub skill_score: u32,
    pub formatting_score: u32,
    pub grade: Grade,
    pub factors: AtsFactors,
}

pub fn has_standard_sections(text: &str) -> bool {
    SECTION_RE.is_match(text)
}

/// Fixed-weight formatting checks: email 33, phone 33, section words 34.
pub fn formatting_score(has_email: bool, has_phone: bool, has_sections: bool) -> u32 {
    [
        (has_email, EMAIL_POINTS),
        (has_phone, PHONE_POINTS),
        (has_sections, SECTIONS_POINTS),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, points)| points)
    .sum()
}

/// Scores `resume_text` against `job_text`.
pub fn ats_score(resume_text: &str, job_text: &str, vocabulary: &Vocabulary) -> AtsReport {
    let analysis = analyze(resume_text, job_text, vocabulary);
    report_from_analysis(resume_text, &analysis)
}

/// Same as `ats_score` for callers that already hold the keyword analysis.
pub fn report_from_analysis(resume_text: &str, analysis: &KeywordAnalysis) -> AtsReport {
    let keyword_score = analysis.match_score;

    let matched = analysis.matched_skills.len();
    let skill_score = if matched == 0 {
        0.0
    } else {
        matched as f64 / (matched + analysis.missing_skills.len()) as f64 * 100.0
    };

    let has_email = extract_email(resume_text).is_some();
    let has_phone = extract_phone(resume_text).is_some();
    let has_sections = has_standard_sections(resume_text);
    let formatting = formatting_score(has_email, has_phone, has_sections);

    let overall = to_score(
        KEYWORD_WEIGHT * f64::from(keyword_score)
            + SKILL_WEIGHT * skill_score
            + FORMATTING_WEIGHT * f64::from(formatting),
    );

    AtsReport {
        overall_score: overall,
        keyword_score,
        skill_score: to_score(skill_score),
        formatting_score: formatting,
        grade: Grade::from_score(overall),
        factors: AtsFactors {
            has_email,
            has_phone,
            has_standard_sections: has_sections,
            keyword_match: keyword_score,
            skill_match: matched,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(80), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(69), Grade::D);
        assert_eq!(Grade::from_score(60), Grade::D);
        assert_eq!(Grade::from_score(59), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::B).unwrap(), "\"B\"");
    }

    #[test]
    fn test_formatting_scenario_without_section_words() {
        let resume = "Experienced in Python and SQL, email me at a@b.com, call 555-123-4567";
        let report = ats_score(resume, "Python developer", &Vocabulary::default());
        assert!(report.factors.has_email);
        assert!(report.factors.has_phone);
        assert!(!report.factors.has_standard_sections);
        assert_eq!(report.formatting_score, 66);
    }

    #[test]
    fn test_formatting_full_marks() {
        assert_eq!(formatting_score(true, true, true), 100);
        assert_eq!(formatting_score(false, false, true), 34);
        assert_eq!(formatting_score(false, false, false), 0);
    }

    #[test]
    fn test_section_words_case_insensitive() {
        assert!(has_standard_sections("WORK EXPERIENCE\n..."));
        assert!(has_standard_sections("Technical Skills: Rust"));
        assert!(!has_standard_sections("Skillset and experiences"));
    }

    #[test]
    fn test_skill_score_zero_without_matches() {
        let report = ats_score("Cooking and gardening", "Python Docker", &Vocabulary::default());
        assert_eq!(report.skill_score, 0);
        assert_eq!(report.factors.skill_match, 0);
    }

    #[test]
    fn test_overall_combines_weights() {
        let resume = "Jane Doe\njane@example.com\n555-123-4567\nSkills: Python Docker";
        let job = "Python Docker";
        let report = ats_score(resume, job, &Vocabulary::default());
        // keywords: python, docker both matched → 100
        assert_eq!(report.keyword_score, 100);
        assert_eq!(report.skill_score, 100);
        assert_eq!(report.formatting_score, 100);
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.grade, Grade::A);
    }
}
