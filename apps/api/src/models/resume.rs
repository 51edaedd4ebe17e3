//! Resume records supplied by the editor. Read-only inputs to the prompt builders;
//! every field is optional on the wire so partially-filled resumes still work.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub position: String,
    pub location: Option<String>,
    pub email: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: String,
    pub achievements: Vec<String>,
    pub tech_stack: Vec<String>,
}

impl WorkExperience {
    /// "Jan 2021 – Present" style range; empty when no dates are known.
    pub fn date_range(&self) -> String {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) => format!("{start} – {end}"),
            (Some(start), None) => format!("{start} – Present"),
            (None, Some(end)) => format!("until {end}"),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub title: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    pub personal: PersonalInfo,
    pub work_experience: Vec<WorkExperience>,
    pub skills: Vec<SkillGroup>,
    pub education: Vec<Education>,
}
