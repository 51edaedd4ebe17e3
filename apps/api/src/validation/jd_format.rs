//! Format check for refined job descriptions.

use super::ValidationResult;

/// Headers every refined job description must carry, in display order.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "position-title",
    "core-responsibilities",
    "required-skills",
    "desired-qualifications",
];

/// Valid iff every required `# section` header is present and has content.
pub fn validate_jd_format(job_description: &str) -> ValidationResult {
    let mut issues = Vec::new();
    if job_description.trim().is_empty() {
        issues.push("Job description is empty".to_string());
    }

    let sections = collect_sections(job_description);

    for &required in REQUIRED_SECTIONS {
        match sections.iter().find(|(name, _)| name == required) {
            None => issues.push(format!("Missing required section: # {required}")),
            Some((_, 0)) => issues.push(format!("Section # {required} is empty")),
            Some(_) => {}
        }
    }

    ValidationResult::from_issues(issues)
}

/// `(header name, non-empty content lines)` for each `#` header, in order.
fn collect_sections(text: &str) -> Vec<(String, usize)> {
    let mut sections: Vec<(String, usize)> = Vec::new();
    for line in text.lines().map(str::trim) {
        if let Some(header) = line.strip_prefix('#') {
            let name = header.trim_start_matches('#').trim().to_lowercase();
            sections.push((name, 0));
        } else if !line.is_empty() {
            if let Some(current) = sections.last_mut() {
                current.1 += 1;
            }
        }
    }
    sections
}
