// Task prompts for the free-text graphs: job title, summary, cover letter and
// job description refinement, plus the prompts their reviewers receive.

use chrono::NaiveDate;

use super::{
    format_candidate, format_education, format_skills, format_work_experience,
    truncate_job_description,
};
use crate::models::ResumeData;

fn resume_block(resume: &ResumeData) -> String {
    format!(
        "CANDIDATE:\n{}\n\nWORK EXPERIENCE:\n{}\n\nSKILLS:\n{}\n\nEDUCATION:\n{}",
        format_candidate(&resume.personal),
        format_work_experience(&resume.work_experience),
        format_skills(&resume.skills),
        format_education(&resume.education),
    )
}

fn analysis_block(analysis: &str) -> String {
    let analysis = analysis.trim();
    if analysis.is_empty() {
        String::new()
    } else {
        format!("\n\nJOB DESCRIPTION ANALYSIS:\n{analysis}")
    }
}

// ── Job description analysis ────────────────────────────────────────────────

pub fn jd_analysis_prompt(job_description: &str) -> String {
    format!(
        r#"Analyze the following job description. In at most 8 short lines, cover:
- seniority and the exact role title used
- must-have skills and technologies
- nice-to-have skills
- the main problems this role is hired to solve
- the tone of the posting

JOB DESCRIPTION:
{}"#,
        truncate_job_description(job_description)
    )
}

// ── Job title ───────────────────────────────────────────────────────────────

pub fn job_title_prompt(resume: &ResumeData, job_description: &str) -> String {
    format!(
        r#"Suggest the job title this candidate should put at the top of their resume when applying for the role below.

{}

TARGET JOB DESCRIPTION:
{}

Reply with the title only."#,
        resume_block(resume),
        truncate_job_description(job_description)
    )
}

pub fn job_title_review_prompt(title: &str, resume: &ResumeData, job_description: &str) -> String {
    format!(
        r#"Review this proposed resume title: "{}"

Candidate's current position: {}

WORK EXPERIENCE:
{}

TARGET JOB DESCRIPTION:
{}

If you critique and can supply a better title, put only the title on the line after the CRITIQUE line."#,
        title.trim(),
        resume.personal.position.trim(),
        format_work_experience(&resume.work_experience),
        truncate_job_description(job_description)
    )
}

// ── Summary ─────────────────────────────────────────────────────────────────

pub fn summary_prompt(resume: &ResumeData, job_description: &str, analysis: &str) -> String {
    format!(
        r#"Write a professional summary for this resume, tailored to the target role.

{}

TARGET JOB DESCRIPTION:
{}{}"#,
        resume_block(resume),
        truncate_job_description(job_description),
        analysis_block(analysis)
    )
}

pub fn summary_review_prompt(summary: &str, resume: &ResumeData, job_description: &str) -> String {
    format!(
        r#"Review this resume summary.

SUMMARY:
{}

RESUME DATA:
{}

TARGET JOB DESCRIPTION:
{}"#,
        summary.trim(),
        resume_block(resume),
        truncate_job_description(job_description)
    )
}

// ── Cover letter ────────────────────────────────────────────────────────────

/// Optional addressing details for a cover letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Addressee<'a> {
    pub company: Option<&'a str>,
    pub hiring_manager: Option<&'a str>,
}

pub fn cover_letter_prompt(
    resume: &ResumeData,
    job_description: &str,
    analysis: &str,
    addressee: Addressee<'_>,
    today: NaiveDate,
) -> String {
    let greeting = match addressee.hiring_manager.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => format!("Dear {name},"),
        None => "Dear Hiring Manager,".to_string(),
    };
    let company = addressee
        .company
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|c| format!("Company: {c}\n"))
        .unwrap_or_default();

    format!(
        r#"Write a cover letter for the role below.

Date: {}
{}Greeting to use: {}

{}

TARGET JOB DESCRIPTION:
{}{}"#,
        today.format("%B %-d, %Y"),
        company,
        greeting,
        resume_block(resume),
        truncate_job_description(job_description),
        analysis_block(analysis)
    )
}

pub fn cover_letter_review_prompt(letter: &str, resume: &ResumeData, job_description: &str) -> String {
    format!(
        r#"Review this cover letter.

COVER LETTER:
{}

RESUME DATA:
{}

TARGET JOB DESCRIPTION:
{}"#,
        letter.trim(),
        resume_block(resume),
        truncate_job_description(job_description)
    )
}

// ── Job description refinement ──────────────────────────────────────────────

pub fn jd_refine_prompt(raw: &str) -> String {
    format!(
        r#"Restructure this job posting into the four required sections.

RAW JOB POSTING:
{}"#,
        truncate_job_description(raw)
    )
}

pub fn jd_review_prompt(formatted: &str, raw: &str) -> String {
    format!(
        r#"Review this restructured job description against the original posting.

RESTRUCTURED:
{}

ORIGINAL POSTING:
{}

Tool input for validate_jd_format: pass the restructured text above as "job_description"."#,
        formatted.trim(),
        truncate_job_description(raw)
    )
}
