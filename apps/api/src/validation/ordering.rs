//! Index-permutation checks for the sorting graphs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ValidationResult;

/// Group and per-group skill order produced by the skills ranker.
///
/// `skill_order[i]` is the order of the skills of ORIGINAL group `i`, not of the
/// group at position `i` of `group_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRanking {
    pub group_order: Vec<usize>,
    pub skill_order: Vec<Vec<usize>>,
}

impl SkillRanking {
    pub fn identity(group_sizes: &[usize]) -> Self {
        Self {
            group_order: (0..group_sizes.len()).collect(),
            skill_order: group_sizes.iter().map(|&n| (0..n).collect()).collect(),
        }
    }

    /// Applies the ranking to `items` grouped as `groups`. Callers must pass the
    /// same groups the ranking was validated against.
    pub fn apply<G: Clone, S: Clone>(
        &self,
        groups: &[G],
        skills_of: impl Fn(&G) -> &[S],
        rebuild: impl Fn(&G, Vec<S>) -> G,
    ) -> Vec<G> {
        self.group_order
            .iter()
            .filter_map(|&g| groups.get(g).map(|group| (g, group)))
            .map(|(g, group)| {
                let skills = skills_of(group);
                let ordered = match self.skill_order.get(g) {
                    Some(order) => order.iter().filter_map(|&s| skills.get(s).cloned()).collect(),
                    None => skills.to_vec(),
                };
                rebuild(group, ordered)
            })
            .collect()
    }
}

/// Parses `text` as a permutation of `0..expected_len`.
pub fn parse_sort_order(text: &str, expected_len: usize) -> Result<Vec<usize>, ValidationResult> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|_| ValidationResult::invalid("Sort order is not valid JSON"))?;
    let indices = integer_array(&value).ok_or_else(|| {
        ValidationResult::invalid("Sort order must be a JSON array of integers")
    })?;

    let issues = permutation_issues(&indices, expected_len, "indices");
    if !issues.is_empty() {
        return Err(ValidationResult::from_issues(issues));
    }
    Ok(indices.into_iter().map(|i| i as usize).collect())
}

/// Valid iff `sort_order` is a JSON array holding each of `0..expected_len` once.
pub fn validate_sort_order(sort_order: &str, expected_len: usize) -> ValidationResult {
    match parse_sort_order(sort_order, expected_len) {
        Ok(_) => ValidationResult::ok(),
        Err(result) => result,
    }
}

/// Parses `{"group_order": [...], "skill_order": [[...], ...]}` against the
/// sizes of the original skill groups.
pub fn parse_skill_ranking(text: &str, group_sizes: &[usize]) -> Result<SkillRanking, ValidationResult> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|_| ValidationResult::invalid("Skill ranking is not valid JSON"))?;
    let Some(object) = value.as_object() else {
        return Err(ValidationResult::invalid(
            "Skill ranking must be a JSON object with group_order and skill_order",
        ));
    };

    let mut issues = Vec::new();

    let group_order = match object.get("group_order").and_then(integer_array) {
        Some(order) => {
            issues.extend(permutation_issues(&order, group_sizes.len(), "group indices"));
            order
        }
        None => {
            issues.push("group_order must be an array of integers".to_string());
            Vec::new()
        }
    };

    let skill_order: Vec<Vec<i64>> = match object.get("skill_order").and_then(Value::as_array) {
        Some(rows) if rows.len() == group_sizes.len() => rows
            .iter()
            .zip(group_sizes)
            .enumerate()
            .map(|(g, (row, &size))| match integer_array(row) {
                Some(order) => {
                    for issue in permutation_issues(&order, size, "skill indices") {
                        issues.push(format!("Group {g}: {issue}"));
                    }
                    order
                }
                None => {
                    issues.push(format!("Group {g}: skill order must be an array of integers"));
                    Vec::new()
                }
            })
            .collect(),
        Some(rows) => {
            issues.push(format!(
                "skill_order must have one entry per group: expected {}, got {}",
                group_sizes.len(),
                rows.len()
            ));
            Vec::new()
        }
        None => {
            issues.push("skill_order must be an array of arrays".to_string());
            Vec::new()
        }
    };

    if !issues.is_empty() {
        return Err(ValidationResult::from_issues(issues));
    }

    Ok(SkillRanking {
        group_order: group_order.into_iter().map(|i| i as usize).collect(),
        skill_order: skill_order
            .into_iter()
            .map(|row| row.into_iter().map(|i| i as usize).collect())
            .collect(),
    })
}

pub fn validate_skills_ranking(ranking: &str, group_sizes: &[usize]) -> ValidationResult {
    match parse_skill_ranking(ranking, group_sizes) {
        Ok(_) => ValidationResult::ok(),
        Err(result) => result,
    }
}

fn integer_array(value: &Value) -> Option<Vec<i64>> {
    value.as_array()?.iter().map(Value::as_i64).collect()
}

/// Issues preventing `values` from being a permutation of `0..n`.
fn permutation_issues(values: &[i64], n: usize, what: &str) -> Vec<String> {
    let mut issues = Vec::new();
    if values.len() != n {
        issues.push(format!("Expected {n} {what}, got {}", values.len()));
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let expected: Vec<i64> = (0..n as i64).collect();
    if sorted != expected {
        let seen: BTreeSet<i64> = values.iter().copied().collect();
        let missing: Vec<i64> = expected.iter().copied().filter(|i| !seen.contains(i)).collect();
        let out_of_range: Vec<i64> = seen
            .iter()
            .copied()
            .filter(|&i| i < 0 || i >= n as i64)
            .collect();
        let duplicated: Vec<i64> = sorted
            .windows(2)
            .filter(|w| w[0] == w[1])
            .map(|w| w[0])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        issues.push(format!(
            "Missing or duplicate index: expected each of 0..{} exactly once \
             (missing {missing:?}, duplicated {duplicated:?}, out of range {out_of_range:?})",
            n.saturating_sub(1)
        ));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_permutation() {
        let r = validate_sort_order("[4,2,0,1,3]", 5);
        assert_eq!(r, ValidationResult::ok());
    }

    #[test]
    fn test_out_of_range_index_is_missing_or_duplicate() {
        let r = validate_sort_order("[5,2,0,1,3]", 5);
        assert!(!r.valid);
        assert_eq!(r.issues.len(), 1);
        assert!(r.issues[0].starts_with("Missing or duplicate index"));
        assert!(r.issues[0].contains("missing [4]"));
        assert!(r.issues[0].contains("out of range [5]"));
    }

    #[test]
    fn test_duplicate_index() {
        let r = validate_sort_order("[0,1,1]", 3);
        assert!(!r.valid);
        assert!(r.issues[0].contains("duplicated [1]"));
    }

    #[test]
    fn test_length_mismatch_reports_count() {
        let r = validate_sort_order("[0,1]", 3);
        assert!(!r.valid);
        assert_eq!(r.issues[0], "Expected 3 indices, got 2");
        assert!(r.issues[1].starts_with("Missing or duplicate index"));
    }

    #[test]
    fn test_not_json() {
        let r = validate_sort_order("the best order is 1, 0", 2);
        assert!(!r.valid);
        assert!(r.issues[0].contains("not valid JSON"));
    }

    #[test]
    fn test_non_integer_entries() {
        let r = validate_sort_order("[0, \"1\", 2]", 3);
        assert!(!r.valid);
        assert!(r.issues[0].contains("array of integers"));
    }

    #[test]
    fn test_empty_list_for_zero_items() {
        assert!(validate_sort_order("[]", 0).valid);
    }

    #[test]
    fn test_parse_sort_order_returns_indices() {
        assert_eq!(parse_sort_order(" [1, 0] ", 2).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_skill_ranking_valid() {
        let text = r#"{"group_order": [1, 0], "skill_order": [[2, 0, 1], [0]]}"#;
        let ranking = parse_skill_ranking(text, &[3, 1]).unwrap();
        assert_eq!(ranking.group_order, vec![1, 0]);
        assert_eq!(ranking.skill_order[0], vec![2, 0, 1]);
    }

    #[test]
    fn test_skill_ranking_wrong_group_count() {
        let text = r#"{"group_order": [0], "skill_order": [[0]]}"#;
        let r = validate_skills_ranking(text, &[1, 2]);
        assert!(!r.valid);
        assert!(r.issues.iter().any(|i| i.contains("one entry per group")));
    }

    #[test]
    fn test_skill_ranking_bad_inner_permutation() {
        let text = r#"{"group_order": [0, 1], "skill_order": [[0, 0], [0]]}"#;
        let r = validate_skills_ranking(text, &[2, 1]);
        assert!(!r.valid);
        assert!(r.issues.iter().any(|i| i.starts_with("Group 0:")));
    }

    #[test]
    fn test_skill_ranking_array_is_rejected() {
        let r = validate_skills_ranking("[0, 1]", &[1, 1]);
        assert!(!r.valid);
        assert!(r.issues[0].contains("JSON object"));
    }

    #[test]
    fn test_identity_and_apply() {
        let groups = vec![
            ("Languages", vec!["Rust", "Go"]),
            ("Cloud", vec!["AWS"]),
        ];
        let identity = SkillRanking::identity(&[2, 1]);
        assert_eq!(identity.group_order, vec![0, 1]);

        let ranking = SkillRanking {
            group_order: vec![1, 0],
            skill_order: vec![vec![1, 0], vec![0]],
        };
        let sorted = ranking.apply(&groups, |g| g.1.as_slice(), |g, skills| (g.0, skills));
        assert_eq!(sorted[0], ("Cloud", vec!["AWS"]));
        assert_eq!(sorted[1], ("Languages", vec!["Go", "Rust"]));
    }
}
