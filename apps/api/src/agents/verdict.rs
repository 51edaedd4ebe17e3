//! Reviewer verdicts. Reviewer replies are parsed here exactly once; pipeline
//! code only ever matches on `Verdict`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Critique {
        reason: String,
        /// A complete replacement the reviewer supplied alongside the critique.
        correction: Option<String>,
    },
}

impl Verdict {
    #[cfg(test)]
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

const CORRECTION_LABELS: &[&str] = &["correction:", "corrected:", "corrected version:", "fixed:"];

/// Parses a reviewer reply.
///
/// Accepted shapes (case-insensitive, markdown emphasis ignored):
/// - `APPROVED` (anything after it is ignored)
/// - `CRITIQUE: reason` optionally followed by a corrected payload on later lines
///
/// Anything else is a critique with the whole reply as the reason, so a
/// confused reviewer never approves by accident.
pub fn parse_verdict(reply: &str) -> Verdict {
    let text = reply.trim();
    let mut lines = text.lines().map(str::trim).skip_while(|l| l.is_empty());

    let Some(first) = lines.next() else {
        return Verdict::Critique {
            reason: "Reviewer returned an empty reply".to_string(),
            correction: None,
        };
    };

    let head = first.trim_matches(|c: char| matches!(c, '*' | '_' | '#' | '`' | ' '));
    let upper = head.to_uppercase();

    if upper.starts_with("APPROVED") {
        return Verdict::Approved;
    }

    if let Some(rest) = strip_keyword(head, &upper, "CRITIQUE") {
        let reason = rest
            .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
            .trim_matches(|c: char| c == '*' || c == '_')
            .trim()
            .to_string();
        let remainder: Vec<&str> = lines.collect();
        return Verdict::Critique {
            reason: if reason.is_empty() {
                "No reason given".to_string()
            } else {
                reason
            },
            correction: correction_from(&remainder),
        };
    }

    Verdict::Critique {
        reason: text.to_string(),
        correction: None,
    }
}

fn strip_keyword<'a>(head: &'a str, upper: &str, keyword: &str) -> Option<&'a str> {
    if upper.starts_with(keyword) {
        head.get(keyword.len()..)
    } else {
        None
    }
}

fn correction_from(lines: &[&str]) -> Option<String> {
    let mut lines: Vec<&str> = lines.to_vec();
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }

    if let Some(first) = lines.first().copied() {
        let lower = first.to_lowercase();
        if let Some(label) = CORRECTION_LABELS.iter().find(|l| lower.starts_with(*l)) {
            let inline = first.get(label.len()..).unwrap_or_default().trim();
            if inline.is_empty() {
                lines.remove(0);
            } else {
                lines[0] = inline;
            }
        }
    }

    let correction = lines.join("\n").trim().to_string();
    (!correction.is_empty()).then_some(correction)
}
