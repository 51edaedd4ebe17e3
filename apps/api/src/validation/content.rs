//! Content heuristics for experience tailoring: achievement integrity,
//! tech-stack fabrication and description rewrites.

use super::ValidationResult;

/// Rewritten achievements shorter than this look truncated or like placeholders.
pub const MIN_ACHIEVEMENT_CHARS: usize = 10;
/// A rewritten description shorter than this is not a real rewrite.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// Spellings treated as the same technology.
const TECH_SYNONYMS: &[&[&str]] = &[
    &["javascript", "js", "ecmascript"],
    &["typescript", "ts"],
    &["kubernetes", "k8s"],
    &["postgresql", "postgres", "psql"],
    &["nodejs", "node"],
    &["golang", "go"],
    &["reactjs", "react"],
    &["vuejs", "vue"],
    &["nextjs", "next"],
    &["amazonwebservices", "aws"],
    &["googlecloudplatform", "gcp", "googlecloud"],
    &["microsoftazure", "azure"],
    &["mongodb", "mongo"],
    &["csharp", "c#"],
    &["cplusplus", "c++", "cpp"],
    &["python", "python3", "py"],
    &["machinelearning", "ml"],
    &["continuousintegration", "ci", "cicd", "ci/cd"],
    &["elasticsearch", "elastic"],
    &["tensorflow", "tf"],
];

const STOPWORDS: &[&str] = &[
    "with", "that", "this", "from", "into", "over", "across", "using", "through", "their",
    "which", "while", "about", "after", "than", "more", "most", "team", "teams",
];

/// Checks that rewritten achievements keep the original count and identity.
pub fn validate_achievements(original: &[String], rewritten: &[String]) -> ValidationResult {
    let mut issues = Vec::new();

    if original.len() != rewritten.len() {
        issues.push(format!(
            "Count mismatch: expected {} achievements, got {}",
            original.len(),
            rewritten.len()
        ));
    }

    for (i, text) in rewritten.iter().enumerate() {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_ACHIEVEMENT_CHARS {
            issues.push(format!(
                "Achievement {i} is empty or too short ({} chars), possibly truncated",
                trimmed.chars().count()
            ));
            continue;
        }
        if let Some(source) = original.get(i) {
            let source_words = significant_words(source);
            if !source_words.is_empty()
                && significant_words(trimmed).is_disjoint(&source_words)
            {
                issues.push(format!(
                    "Achievement {i} shares no key terms with the original \"{}\"",
                    source.trim()
                ));
            }
        }
    }

    ValidationResult::from_issues(issues)
}

/// Flags proposed technologies with no fuzzy match among the originals, and
/// lists that grew well beyond the original size.
pub fn validate_tech_stack(original: &[String], proposed: &[String]) -> ValidationResult {
    let mut issues = Vec::new();

    let originals: Vec<String> = original
        .iter()
        .map(|t| normalize_tech(t))
        .filter(|t| !t.is_empty())
        .collect();

    for term in proposed {
        let normalized = normalize_tech(term);
        if normalized.is_empty() {
            issues.push("Empty technology entry".to_string());
            continue;
        }
        if !originals.iter().any(|o| tech_matches(o, &normalized)) {
            issues.push(format!("Potentially fabricated technology: {}", term.trim()));
        }
    }

    let allowed = original.len() + (original.len() / 2).max(2);
    if proposed.len() > allowed {
        issues.push(format!(
            "Tech stack grew from {} to {} entries (max {allowed})",
            original.len(),
            proposed.len()
        ));
    }

    ValidationResult::from_issues(issues)
}

/// A rewrite must be substantive and actually different from the original.
pub fn validate_description(original: &str, rewritten: &str) -> ValidationResult {
    let rewritten = rewritten.trim();
    if rewritten.is_empty() {
        return ValidationResult::invalid("Description is empty");
    }

    let mut issues = Vec::new();
    let length = rewritten.chars().count();
    if length < MIN_DESCRIPTION_CHARS {
        issues.push(format!(
            "Description is too short ({length} chars, minimum {MIN_DESCRIPTION_CHARS})"
        ));
    }
    if rewritten == original.trim() {
        issues.push("Description is identical to the original; no rewrite was made".to_string());
    }
    ValidationResult::from_issues(issues)
}

/// Lowercase, drop separators (" ", ".", "-", "_"), keep symbols that carry
/// meaning in names such as "c++", "c#" and "ci/cd".
pub fn normalize_tech(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '+' | '#' | '/'))
        .collect()
}

fn tech_matches(original: &str, proposed: &str) -> bool {
    if original == proposed {
        return true;
    }
    // Substring matches only for non-trivial terms; "c" must not match "css".
    let (shorter, longer) = if original.len() <= proposed.len() {
        (original, proposed)
    } else {
        (proposed, original)
    };
    if shorter.len() >= 3 && longer.contains(shorter) {
        return true;
    }
    let canonical_a = canonical(original);
    let canonical_b = canonical(proposed);
    canonical_a.is_some() && canonical_a == canonical_b
}

fn canonical(term: &str) -> Option<&'static str> {
    TECH_SYNONYMS
        .iter()
        .find(|group| group.contains(&term))
        .map(|group| group[0])
}

fn significant_words(text: &str) -> std::collections::HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() > 3 && !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Crude suffix stripping so "optimized"/"optimizing" and "queries"/"query" meet.
fn stem(word: &str) -> String {
    for suffix in ["ing", "ies", "ed", "es", "s"] {
        if let Some(root) = word.strip_suffix(suffix) {
            if root.chars().count() >= 4 {
                return root.to_string();
            }
        }
    }
    word.to_string()
}
