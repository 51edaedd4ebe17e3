use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::review::{refine_text, ungated};
use super::SummaryInput;
use crate::agents::{strip_markdown, Agent, Progress, ProgressCallback};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::prompts::{content, roles};

const MAX_ITERATIONS: usize = 3;

pub async fn generate_summary_graph(
    input: &SummaryInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    run_summary(create_model(config)?, input, on_progress).await
}

/// JD analysis → writer ⇄ reviewer → markdown cleanup.
pub async fn run_summary(
    model: Arc<dyn ChatModel>,
    input: &SummaryInput,
    on_progress: Option<ProgressCallback>,
) -> Result<String, LlmError> {
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        task = "summary",
        provider = model.provider(),
        model = model.model(),
        "graph started"
    );
    let mut progress = Progress::new("summary", on_progress);

    progress.update("Analyzing job description");
    let mut analyst = Agent::new("Job Description Analyst", model.clone(), roles::jd_analyst());
    let analysis = analyst
        .invoke(&content::jd_analysis_prompt(&input.job_description))
        .await?;

    let mut writer = Agent::new("Summary Writer", model.clone(), roles::summary_writer());
    let mut reviewer = Agent::new("Summary Reviewer", model, roles::summary_reviewer());

    let draft = refine_text(
        &mut writer,
        &mut reviewer,
        &content::summary_prompt(&input.resume, &input.job_description, &analysis),
        |summary| content::summary_review_prompt(summary, &input.resume, &input.job_description),
        ungated,
        MAX_ITERATIONS,
        &mut progress,
    )
    .await?;

    let summary = strip_markdown(&draft);
    info!(%run_id, task = "summary", chars = summary.len(), "graph finished");
    progress.finish("Summary ready");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::progress::tests::{assert_finished, recorder};
    use crate::llm_client::testing::ScriptedModel;

    fn input() -> SummaryInput {
        SummaryInput {
            job_description: "We need a Rust engineer for distributed systems.".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_summary_pipeline_order_and_cleanup() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("Job Description Analyst", &["Must have: Rust"])
                .on(
                    "Summary Writer",
                    &["**Backend engineer** with _deep_ `Rust` and ~~Java~~ experience."],
                )
                .on("Summary Reviewer", &["APPROVED"]),
        );
        let (callback, events) = recorder();

        let summary = run_summary(model.clone(), &input(), Some(callback)).await.unwrap();

        assert_eq!(summary, "Backend engineer with deep Rust and Java experience.");
        let roles: Vec<String> = model.calls().into_iter().map(|c| c.role).collect();
        assert_eq!(roles, ["Job Description Analyst", "Summary Writer", "Summary Reviewer"]);
        assert!(model.calls_for("Summary Writer")[0]
            .last_user_message()
            .contains("Must have: Rust"));
        assert_finished(&events.lock().unwrap());
    }

    #[tokio::test]
    async fn test_unapproved_summary_is_still_returned() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("Job Description Analyst", &["analysis"])
                .on("Summary Writer", &["one", "two", "three", "four"])
                .on("Summary Reviewer", &["Not sure about this."]),
        );

        let summary = run_summary(model.clone(), &input(), None).await.unwrap();

        assert_eq!(summary, "three");
        assert_eq!(model.call_count("Summary Writer"), 3);
        assert_eq!(model.call_count("Summary Reviewer"), 3);
    }

    #[tokio::test]
    async fn test_analyst_failure_propagates() {
        let model = Arc::new(ScriptedModel::new().failing("Job Description Analyst"));
        let (callback, events) = recorder();

        let result = run_summary(model, &input(), Some(callback)).await;

        assert!(result.is_err());
        assert_finished(&events.lock().unwrap());
    }
}
