//! Prompts for the experience-tailoring pipeline, one per stage.

use std::collections::BTreeMap;

use super::{format_indexed, format_single_experience, truncate_job_description};
use crate::models::WorkExperience;

fn keyword_list(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "(none)".to_string()
    } else {
        keywords.join(", ")
    }
}

fn json_strings(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

// ── Stage 1: analysis ───────────────────────────────────────────────────────

pub fn experience_analysis_prompt(job: &WorkExperience, job_description: &str) -> String {
    format!(
        r#"Compare this work experience with the job description.

EXPERIENCE:
{}

JOB DESCRIPTION:
{}

Return a JSON object with this EXACT shape:
{{"keywords": ["<JD keyword this role can credibly claim>", ...], "focus": "<one sentence on what to foreground>"}}
List at most 12 keywords, spelled as in the job description."#,
        format_single_experience(job),
        truncate_job_description(job_description)
    )
}

// ── Stage 2: achievements ───────────────────────────────────────────────────

pub fn enrichment_prompt(achievements: &[String], keywords: &[String]) -> String {
    format!(
        r#"Decide which keywords each achievement legitimately demonstrates.

ACHIEVEMENTS:
{}

CANDIDATE KEYWORDS:
{}

Return a JSON object mapping achievement index (as a string) to the keywords it already demonstrates, e.g. {{"0": ["Rust"], "1": []}}.
Only use keywords from the candidate list."#,
        format_indexed(achievements),
        keyword_list(keywords)
    )
}

pub fn scribe_prompt(
    job: &WorkExperience,
    allowed: &BTreeMap<usize, Vec<String>>,
    focus: &str,
    job_description: &str,
) -> String {
    let allowances = job
        .achievements
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let words = allowed.get(&i).map(Vec::as_slice).unwrap_or_default();
            format!("[{i}] {}", keyword_list(words))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Rewrite the achievements of this role for the job description.

ROLE: {} at {}

ACHIEVEMENTS:
{}

KEYWORDS YOU MAY WEAVE INTO EACH ACHIEVEMENT:
{}

FOCUS: {}

JOB DESCRIPTION:
{}

Return a JSON array of exactly {} strings, one rewritten achievement per original, in the original order."#,
        job.position.trim(),
        job.company.trim(),
        format_indexed(&job.achievements),
        allowances,
        if focus.trim().is_empty() { "(none)" } else { focus.trim() },
        truncate_job_description(job_description),
        job.achievements.len()
    )
}

pub fn integrity_prompt(original: &[String], rewritten: &str) -> String {
    format!(
        r#"Audit these rewritten achievements against the originals.

ORIGINAL:
{}

REWRITTEN:
{}

Tool input for validate_achievements: {{"original": {}, "rewritten": <the rewritten array above>}}"#,
        format_indexed(original),
        rewritten.trim(),
        json_strings(original)
    )
}

// ── Stage 3: tech stack ─────────────────────────────────────────────────────

pub fn tech_alignment_prompt(tech_stack: &[String], keywords: &[String], job_description: &str) -> String {
    format!(
        r#"Align this tech stack with the job description.

TECH STACK:
{}

JD KEYWORDS:
{}

JOB DESCRIPTION:
{}

Return a JSON array of technology names, most relevant first. Every entry must come from the tech stack above."#,
        json_strings(tech_stack),
        keyword_list(keywords),
        truncate_job_description(job_description)
    )
}

// ── Stage 4: description ────────────────────────────────────────────────────

pub fn description_prompt(job: &WorkExperience, focus: &str, job_description: &str) -> String {
    format!(
        r#"Rewrite the description of this role for the job description.

EXPERIENCE:
{}

FOCUS: {}

JOB DESCRIPTION:
{}

Reply with the new description only."#,
        format_single_experience(job),
        if focus.trim().is_empty() { "(none)" } else { focus.trim() },
        truncate_job_description(job_description)
    )
}

pub fn fact_check_prompt(job: &WorkExperience, rewritten: &str) -> String {
    format!(
        r#"Fact-check this rewritten role description.

REWRITTEN DESCRIPTION:
{}

ORIGINAL EXPERIENCE:
{}

Tool input for validate_description: {{"original": <original description>, "rewritten": <rewritten description>}}"#,
        rewritten.trim(),
        format_single_experience(job)
    )
}

pub fn relevance_prompt(rewritten: &str, focus: &str, job_description: &str) -> String {
    format!(
        r#"Evaluate how well this role description targets the job description.

DESCRIPTION:
{}

INTENDED FOCUS: {}

JOB DESCRIPTION:
{}"#,
        rewritten.trim(),
        if focus.trim().is_empty() { "(none)" } else { focus.trim() },
        truncate_job_description(job_description)
    )
}
