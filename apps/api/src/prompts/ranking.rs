//! Prompts for the two sorting graphs. Rankers answer with indices only, so
//! the items themselves can never be rewritten on the way through.

use super::{format_indexed, truncate_job_description, NO_SKILLS};
use crate::models::SkillGroup;

fn indexed_skill_groups(groups: &[SkillGroup]) -> String {
    if groups.is_empty() {
        return NO_SKILLS.to_string();
    }
    groups
        .iter()
        .enumerate()
        .map(|(g, group)| {
            let skills = group
                .skills
                .iter()
                .enumerate()
                .map(|(s, skill)| format!("[{s}] {}", skill.trim()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Group [{g}] {}: {skills}", group.title.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn group_sizes_json(groups: &[SkillGroup]) -> String {
    let sizes: Vec<usize> = groups.iter().map(|g| g.skills.len()).collect();
    serde_json::to_string(&sizes).unwrap_or_else(|_| "[]".to_string())
}

// ── Skills ──────────────────────────────────────────────────────────────────

pub fn skills_sort_prompt(groups: &[SkillGroup], job_description: &str) -> String {
    format!(
        r#"Rank these skill groups, and the skills inside each group, by relevance to the job description.

SKILL GROUPS:
{}

JOB DESCRIPTION:
{}

Return a JSON object with this EXACT shape:
{{"group_order": [<group indices, most relevant first>], "skill_order": [[<skill indices of group 0>], [<skill indices of group 1>], ...]}}

Rules:
- group_order contains every group index exactly once.
- skill_order[i] orders the skills of ORIGINAL group i and contains each of its skill indices exactly once.
- skill_order has one entry per group, in original group order."#,
        indexed_skill_groups(groups),
        truncate_job_description(job_description)
    )
}

pub fn skills_review_prompt(ranking: &str, groups: &[SkillGroup], job_description: &str) -> String {
    format!(
        r#"Review this skills ranking.

RANKING:
{}

SKILL GROUPS:
{}

JOB DESCRIPTION:
{}

Tool input for validate_skills_ranking: {{"ranking": <the ranking above as a string>, "group_sizes": {}}}"#,
        ranking.trim(),
        indexed_skill_groups(groups),
        truncate_job_description(job_description),
        group_sizes_json(groups)
    )
}

// ── Achievements ────────────────────────────────────────────────────────────

pub fn achievements_sort_prompt(achievements: &[String], job_description: &str) -> String {
    format!(
        r#"Rank these achievements by relevance and impact for the job description.

ACHIEVEMENTS:
{}

JOB DESCRIPTION:
{}

Return a JSON array containing every index from 0 to {} exactly once, most relevant first, e.g. [2, 0, 1]."#,
        format_indexed(achievements),
        truncate_job_description(job_description),
        achievements.len().saturating_sub(1)
    )
}

pub fn achievements_review_prompt(order: &str, achievements: &[String], job_description: &str) -> String {
    format!(
        r#"Review this achievement order.

ORDER:
{}

ACHIEVEMENTS:
{}

JOB DESCRIPTION:
{}

Tool input for validate_sort_order: {{"sort_order": <the order above as a string>, "expected_length": {}}}"#,
        order.trim(),
        format_indexed(achievements),
        truncate_job_description(job_description),
        achievements.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<SkillGroup> {
        vec![
            SkillGroup {
                title: "Languages".to_string(),
                skills: vec!["Go".to_string(), "Rust".to_string()],
            },
            SkillGroup {
                title: "Cloud".to_string(),
                skills: vec!["AWS".to_string()],
            },
        ]
    }

    #[test]
    fn test_skill_groups_are_indexed() {
        let prompt = skills_sort_prompt(&groups(), "Rust on AWS");
        assert!(prompt.contains("Group [0] Languages: [0] Go, [1] Rust"));
        assert!(prompt.contains("Group [1] Cloud: [0] AWS"));
        assert!(prompt.contains(r#"{"group_order": ["#));
    }

    #[test]
    fn test_skills_review_carries_group_sizes() {
        let prompt = skills_review_prompt("{}", &groups(), "Rust");
        assert!(prompt.contains(r#""group_sizes": [2,1]"#));
    }

    #[test]
    fn test_achievements_prompt_states_index_range() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let prompt = achievements_sort_prompt(&items, "jd");
        assert!(prompt.contains("[1] b"));
        assert!(prompt.contains("every index from 0 to 2"));
        assert!(achievements_review_prompt("[2,1,0]", &items, "jd").contains(r#""expected_length": 3"#));
    }
}
