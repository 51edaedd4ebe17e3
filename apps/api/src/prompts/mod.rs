//! Prompt builders: pure functions from resume/JD data to instructions.
//!
//! Builders only interpolate. They never fail: missing data becomes placeholder
//! text and oversized job descriptions are truncated to `MAX_JD_CHARS`.
//! Keeping the model honest is the job of the instructions (`NO_FABRICATION`)
//! and of the validators, not of these functions.

pub mod content;
pub mod experience;
pub mod ranking;
pub mod roles;

use crate::models::{Education, PersonalInfo, SkillGroup, WorkExperience};

/// Job descriptions beyond this many characters are cut before prompting.
pub const MAX_JD_CHARS: usize = 4000;
const TRUNCATION_MARKER: &str = "\n[... job description truncated ...]";

pub const NO_EXPERIENCE: &str = "No work experience provided";
pub const NO_SKILLS: &str = "No skills provided";
pub const NO_ACHIEVEMENTS: &str = "No achievements provided";
pub const NO_JOB_DESCRIPTION: &str = "No job description provided";

/// Char-boundary-safe truncation of the job description.
pub fn truncate_job_description(jd: &str) -> String {
    let jd = jd.trim();
    if jd.is_empty() {
        return NO_JOB_DESCRIPTION.to_string();
    }
    match jd.char_indices().nth(MAX_JD_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &jd[..cut]),
        None => jd.to_string(),
    }
}

pub fn format_candidate(personal: &PersonalInfo) -> String {
    let name = non_empty(&personal.name).unwrap_or("Candidate");
    let position = non_empty(&personal.position).unwrap_or("Not specified");
    let mut out = format!("Name: {name}\nCurrent position: {position}");
    if let Some(location) = personal.location.as_deref().and_then(non_empty) {
        out.push_str(&format!("\nLocation: {location}"));
    }
    out
}

pub fn format_work_experience(experience: &[WorkExperience]) -> String {
    if experience.is_empty() {
        return NO_EXPERIENCE.to_string();
    }
    experience
        .iter()
        .map(format_single_experience)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_single_experience(job: &WorkExperience) -> String {
    let position = non_empty(&job.position).unwrap_or("Unknown position");
    let company = non_empty(&job.company).unwrap_or("Unknown company");
    let mut out = format!("{position} at {company}");

    let dates = job.date_range();
    if !dates.is_empty() {
        out.push_str(&format!(" ({dates})"));
    }
    if let Some(description) = non_empty(&job.description) {
        out.push_str(&format!("\n  Description: {description}"));
    }
    let achievements: Vec<&str> = job.achievements.iter().filter_map(|a| non_empty(a)).collect();
    if !achievements.is_empty() {
        out.push_str("\n  Achievements:");
        for achievement in achievements {
            out.push_str(&format!("\n  - {achievement}"));
        }
    }
    if !job.tech_stack.is_empty() {
        out.push_str(&format!("\n  Tech stack: {}", job.tech_stack.join(", ")));
    }
    out
}

pub fn format_skills(skills: &[SkillGroup]) -> String {
    let lines: Vec<String> = skills
        .iter()
        .filter(|g| !g.skills.is_empty())
        .map(|g| {
            let title = non_empty(&g.title).unwrap_or("Skills");
            format!("{title}: {}", g.skills.join(", "))
        })
        .collect();
    if lines.is_empty() {
        NO_SKILLS.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn format_education(education: &[Education]) -> String {
    if education.is_empty() {
        return "No education provided".to_string();
    }
    education
        .iter()
        .map(|e| match e.field.as_deref().and_then(non_empty) {
            Some(field) => format!("{} in {field}, {}", e.degree, e.institution),
            None => format!("{}, {}", e.degree, e.institution),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `[0] first\n[1] second`; indices are what the rankers must return.
pub fn format_indexed(items: &[String]) -> String {
    if items.is_empty() {
        return NO_ACHIEVEMENTS.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("[{i}] {}", item.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Loop feedback ───────────────────────────────────────────────────────────

/// Sent back to a writer whose draft a reviewer critiqued. The writer still
/// has its previous draft in its conversation window.
pub fn revision_prompt(reason: &str) -> String {
    format!(
        "Your previous draft was not accepted.\n\
         Reviewer feedback: {reason}\n\n\
         Revise the draft addressing this feedback. Reply with the complete revised \
         version only."
    )
}

/// Sent back to a writer whose output failed a structural check.
pub fn validation_failed_prompt(issues: &str) -> String {
    format!(
        "Your previous output failed validation:\n{issues}\n\n\
         Fix every issue and reply with the complete corrected output only."
    )
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
