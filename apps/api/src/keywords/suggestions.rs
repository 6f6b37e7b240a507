use serde::Serialize;

use super::analyzer::KeywordAnalysis;

const MAX_LISTED: usize = 5;
const MAX_PLACEMENTS: usize = 10;

const EXPERIENCE_CUES: &[&str] = &["led", "managed", "developed", "implemented", "designed"];
const PROJECT_CUES: &[&str] = &["project", "built", "created"];

/// Plain-language advice derived from a keyword analysis.
pub fn optimization_suggestions(analysis: &KeywordAnalysis) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !analysis.missing_skills.is_empty() {
        suggestions.push(format!(
            "Add these key skills to your resume if you have them: {}",
            first_n(&analysis.missing_skills)
        ));
    }

    suggestions.push(
        match analysis.match_score {
            0..=49 => "Your resume has low keyword overlap with the job description. Consider tailoring it more specifically to this role.",
            50..=69 => "Good keyword match, but there's room for improvement. Review missing keywords and add relevant ones.",
            _ => "Excellent keyword match! Your resume aligns well with the job requirements.",
        }
        .to_string(),
    );

    if !analysis.missing_keywords.is_empty() {
        suggestions.push(format!(
            "Consider incorporating these keywords: {}",
            first_n(&analysis.missing_keywords)
        ));
    }

    let job_skills = analysis.matched_skills.len() + analysis.missing_skills.len();
    if job_skills > 0 && (analysis.matched_skills.len() as f64 / job_skills as f64) < 0.6 {
        suggestions.push(
            "Focus on highlighting technical skills that match the job requirements.".to_string(),
        );
    }

    suggestions
}

fn first_n(items: &[String]) -> String {
    items
        .iter()
        .take(MAX_LISTED)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeSection {
    Skills,
    Experience,
    Projects,
}

impl ResumeSection {
    pub fn for_keyword(keyword: &str) -> Self {
        if EXPERIENCE_CUES.iter().any(|cue| keyword.contains(cue)) {
            ResumeSection::Experience
        } else if PROJECT_CUES.iter().any(|cue| keyword.contains(cue)) {
            ResumeSection::Projects
        } else {
            ResumeSection::Skills
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResumeSection::Skills => "Skills or Technical Skills section",
            ResumeSection::Experience => "Work Experience descriptions",
            ResumeSection::Projects => "Projects or Achievements section",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSuggestion {
    pub keyword: String,
    pub section: ResumeSection,
    pub section_label: &'static str,
    pub priority: &'static str,
}

/// Where each missing keyword would best fit, for the first ten keywords.
pub fn placement_suggestions(missing_keywords: &[String]) -> Vec<PlacementSuggestion> {
    missing_keywords
        .iter()
        .take(MAX_PLACEMENTS)
        .map(|keyword| {
            let section = ResumeSection::for_keyword(keyword);
            PlacementSuggestion {
                keyword: keyword.clone(),
                section,
                section_label: section.label(),
                priority: "high",
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn analysis(score: u32, matched_skills: &[&str], missing_skills: &[&str]) -> KeywordAnalysis {
        KeywordAnalysis {
            matched_keywords: vec![],
            missing_keywords: owned(&["kubernetes", "terraform"]),
            matched_skills: owned(matched_skills),
            missing_skills: owned(missing_skills),
            match_score: score,
            total_job_keywords: 2,
            total_matched_keywords: 0,
        }
    }

    #[test]
    fn test_low_score_suggestions() {
        let suggestions = optimization_suggestions(&analysis(30, &[], &["docker", "aws"]));
        assert_eq!(suggestions.len(), 4);
        assert!(suggestions[0].ends_with("docker, aws"));
        assert!(suggestions[1].contains("low keyword overlap"));
        assert!(suggestions[2].ends_with("kubernetes, terraform"));
        assert!(suggestions[3].starts_with("Focus on"));
    }

    #[test]
    fn test_excellent_score_without_skill_gap() {
        let suggestions = optimization_suggestions(&analysis(85, &["python"], &[]));
        assert!(suggestions[0].starts_with("Excellent"));
        assert!(!suggestions.iter().any(|s| s.starts_with("Focus on")));
    }

    #[test]
    fn test_no_skill_focus_when_job_lists_no_skills() {
        let suggestions = optimization_suggestions(&analysis(60, &[], &[]));
        assert!(suggestions[0].starts_with("Good keyword match"));
        assert!(!suggestions.iter().any(|s| s.starts_with("Focus on")));
    }

    #[test]
    fn test_missing_skills_listed_up_to_five() {
        let skills = ["a1", "b2", "c3", "d4", "e5", "f6"];
        let suggestions = optimization_suggestions(&analysis(10, &[], &skills));
        assert!(suggestions[0].ends_with("a1, b2, c3, d4, e5"));
    }

    #[test]
    fn test_placement_sections() {
        let keywords: Vec<String> = ["developed", "projects", "rust", "builtin"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let placements = placement_suggestions(&keywords);
        let sections: Vec<ResumeSection> = placements.iter().map(|p| p.section).collect();
        assert_eq!(
            sections,
            vec![
                ResumeSection::Experience,
                ResumeSection::Projects,
                ResumeSection::Skills,
                ResumeSection::Projects,
            ]
        );
        assert!(placements.iter().all(|p| p.priority == "high"));
    }

    #[test]
    fn test_placements_capped_at_ten() {
        let keywords: Vec<String> = (0..12).map(|i| format!("kw{i}")).collect();
        assert_eq!(placement_suggestions(&keywords).len(), 10);
    }
}
