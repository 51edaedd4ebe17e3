//! Agent graphs: one fixed pipeline of agent invocations per task.
//!
//! Every graph is exposed twice: `*_graph` builds the model from an
//! `AgentConfig`, and the `run_*` twin takes an already-built model (tests
//! hand it a scripted one). Calls inside a graph are sequential; each run
//! creates its own agents, so concurrent runs share nothing.
//!
//! Failure semantics:
//! - model/transport errors propagate as `LlmError`
//! - unparseable structured output falls back to a deterministic default
//! - validation failures are fed back into the loop, never returned

pub mod cover_letter;
pub mod handlers;
pub mod job_description;
pub mod job_title;
pub mod review;
pub mod sort_achievements;
pub mod sort_skills;
pub mod summary;
pub mod tailor_experience;

use serde::{Deserialize, Serialize};

use crate::models::{ResumeData, SkillGroup, WorkExperience};

pub use cover_letter::generate_cover_letter_graph;
pub use job_description::analyze_job_description_graph;
pub use job_title::generate_job_title_graph;
pub use sort_achievements::sort_achievements_graph;
pub use sort_skills::sort_skills_graph;
pub use summary::generate_summary_graph;
pub use tailor_experience::{tailor_experience_to_jd_graph, TailoredExperience};

// ────────────────────────────────────────────────────────────────────────────
// Graph inputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTitleInput {
    pub resume: ResumeData,
    pub job_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryInput {
    pub resume: ResumeData,
    pub job_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverLetterInput {
    pub resume: ResumeData,
    pub job_description: String,
    pub company: Option<String>,
    pub hiring_manager: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSkillsInput {
    pub skills: Vec<SkillGroup>,
    pub job_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortAchievementsInput {
    pub achievements: Vec<String>,
    pub job_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeJdInput {
    pub job_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TailorExperienceInput {
    pub experience: WorkExperience,
    pub job_description: String,
}
