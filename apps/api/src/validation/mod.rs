//! Structural validation: deterministic checks that ground critic agents.
//!
//! Every validator returns a `ValidationResult` and never fails: malformed input
//! is reported as `valid: false` with a descriptive issue. Results are evidence
//! for the reviewing agent and gates for the graph loops, not hard errors.

use serde::{Deserialize, Serialize};

pub mod content;
pub mod jd_format;
pub mod ordering;
pub mod tools;

pub use content::{validate_achievements, validate_description, validate_tech_stack};
pub use jd_format::validate_jd_format;
pub use ordering::{parse_skill_ranking, parse_sort_order, validate_skills_ranking, validate_sort_order};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }

    pub fn invalid(issue: impl Into<String>) -> Self {
        Self {
            valid: false,
            issues: vec![issue.into()],
        }
    }

    /// Valid exactly when no issues were collected.
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    /// Issues as a bullet list for critique prompts.
    pub fn issues_as_list(&self) -> String {
        self.issues
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
