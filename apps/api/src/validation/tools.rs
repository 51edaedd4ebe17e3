//! Validators exposed as agent tools.
//!
//! Critic agents call these mid-review; graphs also run the same functions
//! directly as gates, so tool and gate can never disagree.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::agents::Tool;

use super::{
    validate_achievements, validate_description, validate_jd_format, validate_skills_ranking,
    validate_sort_order, validate_tech_stack, ValidationResult,
};

fn decode<T: DeserializeOwned>(input: &Value) -> Result<T, ValidationResult> {
    serde_json::from_value(input.clone())
        .map_err(|e| ValidationResult::invalid(format!("Invalid tool input: {e}")))
}

/// Models sometimes pass JSON payloads as strings and sometimes inline.
fn as_json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
struct SortOrderInput {
    sort_order: Value,
    expected_length: usize,
}

pub struct SortOrderTool;

impl Tool for SortOrderTool {
    fn name(&self) -> &'static str {
        "validate_sort_order"
    }

    fn description(&self) -> &'static str {
        "Checks that a sort order is a JSON array containing every index 0..N-1 exactly once."
    }

    fn input_example(&self) -> &'static str {
        r#"{"sort_order": "[2,0,1]", "expected_length": 3}"#
    }

    fn call(&self, input: &Value) -> ValidationResult {
        match decode::<SortOrderInput>(input) {
            Ok(i) => validate_sort_order(&as_json_text(&i.sort_order), i.expected_length),
            Err(invalid) => invalid,
        }
    }
}

#[derive(Deserialize)]
struct SkillsRankingInput {
    ranking: Value,
    group_sizes: Vec<usize>,
}

pub struct SkillsRankingTool;

impl Tool for SkillsRankingTool {
    fn name(&self) -> &'static str {
        "validate_skills_ranking"
    }

    fn description(&self) -> &'static str {
        "Checks that a skills ranking orders every group once and every skill within each group once."
    }

    fn input_example(&self) -> &'static str {
        r#"{"ranking": {"group_order": [1,0], "skill_order": [[1,0],[0]]}, "group_sizes": [2,1]}"#
    }

    fn call(&self, input: &Value) -> ValidationResult {
        match decode::<SkillsRankingInput>(input) {
            Ok(i) => validate_skills_ranking(&as_json_text(&i.ranking), &i.group_sizes),
            Err(invalid) => invalid,
        }
    }
}

#[derive(Deserialize)]
struct AchievementsInput {
    original: Vec<String>,
    rewritten: Vec<String>,
}

pub struct AchievementsTool;

impl Tool for AchievementsTool {
    fn name(&self) -> &'static str {
        "validate_achievements"
    }

    fn description(&self) -> &'static str {
        "Checks that rewritten achievements keep the original count, are not truncated, and still describe the same accomplishment."
    }

    fn input_example(&self) -> &'static str {
        r#"{"original": ["Built X"], "rewritten": ["Built X in Rust, serving 2M users"]}"#
    }

    fn call(&self, input: &Value) -> ValidationResult {
        match decode::<AchievementsInput>(input) {
            Ok(i) => validate_achievements(&i.original, &i.rewritten),
            Err(invalid) => invalid,
        }
    }
}

#[derive(Deserialize)]
struct TechStackInput {
    original: Vec<String>,
    proposed: Vec<String>,
}

pub struct TechStackTool;

impl Tool for TechStackTool {
    fn name(&self) -> &'static str {
        "validate_tech_stack"
    }

    fn description(&self) -> &'static str {
        "Flags proposed technologies that do not match any original technology, and lists that grew too much."
    }

    fn input_example(&self) -> &'static str {
        r#"{"original": ["Rust", "Postgres"], "proposed": ["PostgreSQL", "Rust"]}"#
    }

    fn call(&self, input: &Value) -> ValidationResult {
        match decode::<TechStackInput>(input) {
            Ok(i) => validate_tech_stack(&i.original, &i.proposed),
            Err(invalid) => invalid,
        }
    }
}

#[derive(Deserialize)]
struct DescriptionInput {
    original: String,
    rewritten: String,
}

pub struct DescriptionTool;

impl Tool for DescriptionTool {
    fn name(&self) -> &'static str {
        "validate_description"
    }

    fn description(&self) -> &'static str {
        "Checks that a rewritten role description is substantive and differs from the original."
    }

    fn input_example(&self) -> &'static str {
        r#"{"original": "Backend developer.", "rewritten": "Backend developer owning ..."}"#
    }

    fn call(&self, input: &Value) -> ValidationResult {
        match decode::<DescriptionInput>(input) {
            Ok(i) => validate_description(&i.original, &i.rewritten),
            Err(invalid) => invalid,
        }
    }
}

#[derive(Deserialize)]
struct JdFormatInput {
    job_description: String,
}

pub struct JdFormatTool;

impl Tool for JdFormatTool {
    fn name(&self) -> &'static str {
        "validate_jd_format"
    }

    fn description(&self) -> &'static str {
        "Checks that a job description has the four required '# section' headers with content."
    }

    fn input_example(&self) -> &'static str {
        r##"{"job_description": "# position-title\n..."}"##
    }

    fn call(&self, input: &Value) -> ValidationResult {
        match decode::<JdFormatInput>(input) {
            Ok(i) => validate_jd_format(&i.job_description),
            Err(invalid) => invalid,
        }
    }
}
