//! Writer/reviewer refinement loops shared by the graphs.
//!
//! Both loops bound the number of writer drafts by `max_iterations`. A draft
//! that fails its deterministic check never reaches the reviewer; the issues go
//! straight back to the writer instead.

use tracing::debug;

use crate::agents::{extract_json, parse_verdict, Agent, Progress, Verdict};
use crate::llm_client::LlmError;
use crate::prompts::{revision_prompt, validation_failed_prompt};
use crate::validation::ValidationResult;

/// Gate for text loops that have no structural check.
pub fn ungated(_: &str) -> ValidationResult {
    ValidationResult::ok()
}

/// Runs writer → gate → reviewer until approval or the bound.
///
/// - `APPROVED` returns the current draft.
/// - A critique with a correction that passes the gate returns the correction.
/// - Otherwise the reason (or the gate's issues) is sent back to the writer.
///
/// After the bound the latest draft is returned: free text has no invalid
/// state, only a lower quality one.
pub async fn refine_text<R, G>(
    writer: &mut Agent,
    reviewer: &mut Agent,
    prompt: &str,
    review_prompt: R,
    gate: G,
    max_iterations: usize,
    progress: &mut Progress,
) -> Result<String, LlmError>
where
    R: Fn(&str) -> String,
    G: Fn(&str) -> ValidationResult,
{
    progress.update(format!("{} is drafting", writer.name()));
    let mut draft = writer.invoke(prompt).await?;

    for iteration in 1..=max_iterations {
        let check = gate(&draft);
        let feedback = if !check.valid {
            debug!(writer = writer.name(), iteration, "draft failed gate");
            validation_failed_prompt(&check.issues_as_list())
        } else {
            progress.update(format!(
                "{} is reviewing (round {iteration}/{max_iterations})",
                reviewer.name()
            ));
            match parse_verdict(&reviewer.invoke(&review_prompt(&draft)).await?) {
                Verdict::Approved => return Ok(draft),
                Verdict::Critique {
                    correction: Some(correction),
                    ..
                } if gate(&correction).valid => {
                    debug!(reviewer = reviewer.name(), iteration, "adopting reviewer correction");
                    return Ok(correction);
                }
                Verdict::Critique { reason, .. } => revision_prompt(&reason),
            }
        };

        if iteration == max_iterations {
            break;
        }
        progress.update(format!("{} is revising", writer.name()));
        draft = writer.invoke(&feedback).await?;
    }

    Ok(draft)
}

/// Same loop for JSON outputs. `parse` turns a reply into a validated value or
/// the issues that explain why it is not one.
///
/// Returns the approved value, a validated reviewer correction, or the latest
/// valid candidate the reviewer did not approve; `None` when no reply ever
/// validated.
pub async fn refine_structured<T, P, R>(
    writer: &mut Agent,
    reviewer: &mut Agent,
    prompt: &str,
    parse: P,
    review_prompt: R,
    max_iterations: usize,
    progress: &mut Progress,
) -> Result<Option<T>, LlmError>
where
    P: Fn(&str) -> Result<T, ValidationResult>,
    R: Fn(&str) -> String,
{
    progress.update(format!("{} is drafting", writer.name()));
    let mut reply = writer.invoke(prompt).await?;
    let mut best = None;

    for iteration in 1..=max_iterations {
        let feedback = match parse(&reply) {
            Err(check) => {
                debug!(writer = writer.name(), iteration, issues = ?check.issues, "invalid structured output");
                validation_failed_prompt(&check.issues_as_list())
            }
            Ok(candidate) => {
                progress.update(format!(
                    "{} is reviewing (round {iteration}/{max_iterations})",
                    reviewer.name()
                ));
                let review = reviewer.invoke(&review_prompt(&json_text(&reply))).await?;
                match parse_verdict(&review) {
                    Verdict::Approved => return Ok(Some(candidate)),
                    Verdict::Critique { reason, correction } => {
                        if let Some(fixed) = correction.as_deref().and_then(|c| parse(c).ok()) {
                            debug!(reviewer = reviewer.name(), iteration, "adopting reviewer correction");
                            return Ok(Some(fixed));
                        }
                        best = Some(candidate);
                        revision_prompt(&reason)
                    }
                }
            }
        };

        if iteration == max_iterations {
            break;
        }
        progress.update(format!("{} is revising", writer.name()));
        reply = writer.invoke(&feedback).await?;
    }

    Ok(best)
}

/// The JSON value inside a model reply, re-serialized compactly; the trimmed
/// reply itself when none is found, so validators can report why.
pub fn json_text(reply: &str) -> String {
    match extract_json::<serde_json::Value>(reply) {
        Some(value) => value.to_string(),
        None => reply.trim().to_string(),
    }
}
