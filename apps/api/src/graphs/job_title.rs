use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::review::{refine_text, ungated};
use super::JobTitleInput;
use crate::agents::{clean_job_title, Agent, Progress, ProgressCallback};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::prompts::{content, roles};

const MAX_ITERATIONS: usize = 2;

pub async fn generate_job_title_graph(
    input: &JobTitleInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    run_job_title(create_model(config)?, input, on_progress).await
}

/// Writer ⇄ reviewer, then reduced to a bare title. An empty result falls back
/// to the candidate's current position.
pub async fn run_job_title(
    model: Arc<dyn ChatModel>,
    input: &JobTitleInput,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        task = "job_title",
        provider = model.provider(),
        model = model.model(),
        "graph started"
    );
    let mut progress = Progress::new("job title", on_progress);

    let mut writer = Agent::new("Job Title Writer", model.clone(), roles::job_title_writer());
    let mut reviewer = Agent::new("Job Title Reviewer", model, roles::job_title_reviewer());

    let draft = refine_text(
        &mut writer,
        &mut reviewer,
        &content::job_title_prompt(&input.resume, &input.job_description),
        |title| content::job_title_review_prompt(title, &input.resume, &input.job_description),
        ungated,
        MAX_ITERATIONS,
        &mut progress,
    )
    .await?;

    let mut title = clean_job_title(&draft);
    if title.is_empty() {
        title = clean_job_title(&input.resume.personal.position);
    }

    info!(%run_id, task = "job_title", "graph finished");
    progress.finish("Job title ready");
    Ok(title)
}
