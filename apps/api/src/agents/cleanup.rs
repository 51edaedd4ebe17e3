//! Deterministic post-processing for free-text outputs. Applied to every final
//! title/summary/cover-letter/JD regardless of what review concluded.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    fence: Regex,
    inline_code: Regex,
    bold_star: Regex,
    bold_underscore: Regex,
    strikethrough: Regex,
    italic_star: Regex,
    italic_underscore: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("static markdown pattern must compile");
        Patterns {
            fence: compile(r"(?m)^[ \t]*```[\w+-]*[ \t]*\n?"),
            inline_code: compile(r"`([^`\n]+)`"),
            bold_star: compile(r"\*\*([^*\n]+?)\*\*"),
            bold_underscore: compile(r"__([^_\n]+?)__"),
            strikethrough: compile(r"~~([^~\n]+?)~~"),
            italic_star: compile(r"(^|[^*\w])\*([^*\s](?:[^*\n]*[^*\s])?)\*"),
            italic_underscore: compile(r"(^|[^_\w])_([^_\s](?:[^_\n]*[^_\s])?)_($|[^_\w])"),
        }
    })
}

/// Removes markdown emphasis (bold, italic, strikethrough, inline code, code
/// fences). Headers, list markers and `snake_case` identifiers are untouched.
pub fn strip_markdown(text: &str) -> String {
    let p = patterns();
    let mut out = p.fence.replace_all(text, "").into_owned();
    out = p.inline_code.replace_all(&out, "$1").into_owned();
    out = p.bold_star.replace_all(&out, "$1").into_owned();
    out = p.bold_underscore.replace_all(&out, "$1").into_owned();
    out = p.strikethrough.replace_all(&out, "$1").into_owned();
    out = p.italic_star.replace_all(&out, "${1}${2}").into_owned();

    // Adjacent `_a_ _b_` share the separating character; repeat until stable.
    for _ in 0..4 {
        let next = p
            .italic_underscore
            .replace_all(&out, "${1}${2}${3}")
            .into_owned();
        if next == out {
            break;
        }
        out = next;
    }

    out.replace("**", "")
        .replace("~~", "")
        .replace('`', "")
        .trim()
        .to_string()
}

const TITLE_LABELS: &[&str] = &["job title:", "title:", "suggested title:"];

/// Reduces a model reply to a bare job title: first line, no label, no quotes.
pub fn clean_job_title(text: &str) -> String {
    let stripped = strip_markdown(text);
    let first = stripped
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    let lower = first.to_lowercase();
    let unlabelled = TITLE_LABELS
        .iter()
        .find(|label| lower.starts_with(*label))
        .and_then(|label| first.get(label.len()..))
        .unwrap_or(first);

    unlabelled
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”'))
        .trim_end_matches('.')
        .trim()
        .to_string()
}
