//! Dashboard analytics: aggregate counts over the stored candidates and job
//! postings. Everything here is a pure function of its inputs; handlers load
//! the data and stamp the time.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::models::candidate::CandidateProfile;
use crate::models::job::{JobPosting, JobStatus};

pub mod handlers;

/// How many of the latest uploads count as "recent".
pub const RECENT_WINDOW: usize = 30;
pub const DEFAULT_TOP_SKILLS: usize = 10;
pub const MAX_TOP_SKILLS: usize = 100;
pub const DEFAULT_TREND_DAYS: u64 = 30;
pub const MAX_TREND_DAYS: u64 = 365;
const TOP_COMPANIES: usize = 5;

const SUCCESS_THRESHOLD: u32 = 80;
const MODERATE_THRESHOLD: u32 = 60;

/// Rounded share of `part` in `whole`, 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// Counts keys, most frequent first. Ties keep first-seen order.
fn ranked_counts<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ────────────────────────────────────────────────────────────────────────────
// Overview
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_resumes: usize,
    pub total_jobs: usize,
    pub recent_resumes: usize,
    pub active_jobs: usize,
    pub timestamp: DateTime<Utc>,
}

pub fn overview(
    candidates: &[CandidateProfile],
    jobs: &[JobPosting],
    now: DateTime<Utc>,
) -> DashboardOverview {
    DashboardOverview {
        total_resumes: candidates.len(),
        total_jobs: jobs.len(),
        recent_resumes: candidates.len().min(RECENT_WINDOW),
        active_jobs: jobs.iter().filter(|j| j.status == JobStatus::Active).count(),
        timestamp: now,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills and education
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
    /// Share of all candidates listing the skill.
    pub percentage: u32,
}

pub fn top_skills(candidates: &[CandidateProfile], top_n: usize) -> Vec<SkillCount> {
    let lowered: Vec<String> = candidates
        .iter()
        .flat_map(|c| c.profile.skills.iter().map(|s| s.to_lowercase()))
        .collect();

    ranked_counts(lowered.iter().map(String::as_str))
        .into_iter()
        .take(top_n)
        .map(|(skill, count)| SkillCount {
            skill,
            count,
            percentage: percentage(count, candidates.len()),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EducationLevel {
    Bachelor,
    Master,
    #[serde(rename = "PhD")]
    Phd,
    Other,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 4] = [
        EducationLevel::Bachelor,
        EducationLevel::Master,
        EducationLevel::Phd,
        EducationLevel::Other,
    ];

    /// Highest degree mentioned anywhere in the education lines.
    pub fn classify(education: &[String]) -> Self {
        let text = education.join(" ").to_lowercase();
        let mentions = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if mentions(&["phd", "doctorate"]) {
            EducationLevel::Phd
        } else if mentions(&["master", "m.s", "mba"]) {
            EducationLevel::Master
        } else if mentions(&["bachelor", "b.s", "b.tech"]) {
            EducationLevel::Bachelor
        } else {
            EducationLevel::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationShare {
    pub level: EducationLevel,
    pub count: usize,
    pub percentage: u32,
}

/// Candidates without any education line are not counted in any level but
/// still count towards the percentage denominator.
pub fn education_distribution(candidates: &[CandidateProfile]) -> Vec<EducationShare> {
    let levels: Vec<EducationLevel> = candidates
        .iter()
        .filter(|c| !c.profile.education.is_empty())
        .map(|c| EducationLevel::classify(&c.profile.education))
        .collect();

    EducationLevel::ALL
        .into_iter()
        .map(|level| {
            let count = levels.iter().filter(|&&l| l == level).count();
            EducationShare {
                level,
                count,
                percentage: percentage(count, candidates.len()),
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Submissions over time
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Uploads per UTC day for the `days` days ending on `today`, oldest first.
pub fn submission_trend(
    candidates: &[CandidateProfile],
    days: u64,
    today: NaiveDate,
) -> Vec<DailyCount> {
    let mut trend: Vec<DailyCount> = (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| DailyCount { date, count: 0 })
        .collect();

    for candidate in candidates {
        let day = candidate.uploaded_at.date_naive();
        if let Some(slot) = trend.iter_mut().find(|d| d.date == day) {
            slot.count += 1;
        }
    }

    trend
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs and match outcomes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCount {
    pub company: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: usize,
    pub active: usize,
    pub closed: usize,
    pub draft: usize,
    pub top_companies: Vec<CompanyCount>,
}

pub fn job_stats(jobs: &[JobPosting]) -> JobStats {
    let with_status = |status: JobStatus| jobs.iter().filter(|j| j.status == status).count();

    let top_companies = ranked_counts(
        jobs.iter()
            .map(|j| j.company.trim())
            .filter(|c| !c.is_empty()),
    )
    .into_iter()
    .take(TOP_COMPANIES)
    .map(|(company, count)| CompanyCount { company, count })
    .collect();

    JobStats {
        total: jobs.len(),
        active: with_status(JobStatus::Active),
        closed: with_status(JobStatus::Closed),
        draft: with_status(JobStatus::Draft),
        top_companies,
    }
}

/// Match score bands over a set of results: successful (80 and up),
/// moderate (60 to 79) and low.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub total: usize,
    pub successful: usize,
    pub moderate: usize,
    pub low: usize,
    pub success_rate: u32,
    pub average_score: u32,
}

impl MatchStats {
    pub fn from_scores(scores: &[u32]) -> Self {
        let total = scores.len();
        let successful = scores.iter().filter(|&&s| s >= SUCCESS_THRESHOLD).count();
        let moderate = scores
            .iter()
            .filter(|&&s| (MODERATE_THRESHOLD..SUCCESS_THRESHOLD).contains(&s))
            .count();
        let average_score = if total == 0 {
            0
        } else {
            (scores.iter().map(|&s| s as f64).sum::<f64>() / total as f64).round() as u32
        };

        Self {
            total,
            successful,
            moderate,
            low: total - successful - moderate,
            success_rate: percentage(successful, total),
            average_score,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Everything at once
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub overview: DashboardOverview,
    pub top_skills: Vec<SkillCount>,
    pub submission_trend: Vec<DailyCount>,
    pub job_stats: JobStats,
    pub education_distribution: Vec<EducationShare>,
    pub generated_at: DateTime<Utc>,
}

pub fn comprehensive(
    candidates: &[CandidateProfile],
    jobs: &[JobPosting],
    now: DateTime<Utc>,
) -> Analytics {
    Analytics {
        overview: overview(candidates, jobs, now),
        top_skills: top_skills(candidates, DEFAULT_TOP_SKILLS),
        submission_trend: submission_trend(candidates, DEFAULT_TREND_DAYS, now.date_naive()),
        job_stats: job_stats(jobs),
        education_distribution: education_distribution(candidates),
        generated_at: now,
    }
}
