use std::sync::Arc;

use chrono::Local;
use tracing::info;
use uuid::Uuid;

use super::review::{refine_text, ungated};
use super::CoverLetterInput;
use crate::agents::{strip_markdown, Agent, Progress, ProgressCallback};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::prompts::content::{self, Addressee};
use crate::prompts::roles;

const MAX_ITERATIONS: usize = 2;

pub async fn generate_cover_letter_graph(
    input: &CoverLetterInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    run_cover_letter(create_model(config)?, input, on_progress).await
}

pub async fn run_cover_letter(
    model: Arc<dyn ChatModel>,
    input: &CoverLetterInput,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        task = "cover_letter",
        provider = model.provider(),
        model = model.model(),
        "graph started"
    );
    let mut progress = Progress::new("cover letter", on_progress);

    progress.update("Analyzing job description");
    let mut analyst = Agent::new("Job Description Analyst", model.clone(), roles::jd_analyst());
    let analysis = analyst
        .invoke(&content::jd_analysis_prompt(&input.job_description))
        .await?;

    let addressee = Addressee {
        company: input.company.as_deref(),
        hiring_manager: input.hiring_manager.as_deref(),
    };
    let prompt = content::cover_letter_prompt(
        &input.resume,
        &input.job_description,
        &analysis,
        addressee,
        Local::now().date_naive(),
    );

    let mut writer = Agent::new("Cover Letter Writer", model.clone(), roles::cover_letter_writer());
    let mut reviewer = Agent::new("Cover Letter Reviewer", model, roles::cover_letter_reviewer());

    let draft = refine_text(
        &mut writer,
        &mut reviewer,
        &prompt,
        |letter| content::cover_letter_review_prompt(letter, &input.resume, &input.job_description),
        ungated,
        MAX_ITERATIONS,
        &mut progress,
    )
    .await?;

    let letter = strip_markdown(&draft);
    info!(%run_id, task = "cover_letter", chars = letter.len(), "graph finished");
    progress.finish("Cover letter ready");
    Ok(letter)
}
