use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::review::refine_text;
use super::AnalyzeJdInput;
use crate::agents::{strip_markdown, Agent, Progress, ProgressCallback};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::prompts::{content, roles};
use crate::validation::tools::JdFormatTool;
use crate::validation::validate_jd_format;

const MAX_ITERATIONS: usize = 3;

pub async fn analyze_job_description_graph(
    input: &AnalyzeJdInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    run_job_description(create_model(config)?, input, on_progress).await
}

/// Restructures a raw posting into the four-section markdown layout.
///
/// Drafts are gated on `validate_jd_format` (after emphasis is stripped, the
/// same form the caller receives) before the reviewer sees them.
pub async fn run_job_description(
    model: Arc<dyn ChatModel>,
    input: &AnalyzeJdInput,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    let mut progress = Progress::new("job description", on_progress);
    if input.job_description.trim().is_empty() {
        progress.finish("No job description to refine");
        return Ok(String::new());
    }

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        task = "job_description",
        chars = input.job_description.len(),
        model = model.model(),
        "graph started"
    );

    let mut formatter = Agent::new("Job Description Formatter", model.clone(), roles::jd_formatter());
    let mut reviewer = Agent::new("Job Description Format Reviewer", model, roles::jd_reviewer())
        .with_tool(JdFormatTool);

    let draft = refine_text(
        &mut formatter,
        &mut reviewer,
        &content::jd_refine_prompt(&input.job_description),
        |formatted| content::jd_review_prompt(formatted, &input.job_description),
        |formatted| validate_jd_format(&strip_markdown(formatted)),
        MAX_ITERATIONS,
        &mut progress,
    )
    .await?;

    let refined = strip_markdown(&draft);
    let check = validate_jd_format(&refined);
    if !check.valid {
        warn!(%run_id, issues = ?check.issues, "returning job description that still fails format checks");
    }

    info!(%run_id, task = "job_description", "graph finished");
    progress.finish("Job description refined");
    Ok(refined)
}
