//! Axum route handlers for the AI API.
//!
//! Each graph is wrapped as an `AiTask`; the generic handlers below give every
//! task a JSON endpoint and a Server-Sent-Events endpoint that streams the
//! graph's progress events before the result.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use super::*;
use crate::agents::{ProgressCallback, ProgressEvent};
use crate::errors::AppError;
use crate::llm_client::{AgentConfig, LlmError};
use crate::models::SkillGroup;
use crate::state::AppState;
use crate::validation::ordering::SkillRanking;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Task input fields plus the optional provider settings for this request.
#[derive(Debug, Deserialize)]
pub struct AiRequest<T> {
    #[serde(flatten)]
    pub input: T,
    #[serde(default)]
    pub agent_config: Option<AgentConfig>,
}

#[derive(Debug, Serialize)]
pub struct JobTitleResponse {
    pub job_title: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Serialize)]
pub struct SortSkillsResponse {
    pub ranking: SkillRanking,
    pub skills: Vec<SkillGroup>,
}

#[derive(Debug, Serialize)]
pub struct SortAchievementsResponse {
    pub ranked_indices: Vec<usize>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobDescriptionResponse {
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

/// One graph as seen by the HTTP layer.
#[async_trait]
pub trait AiTask: Send + Sync + 'static {
    const NAME: &'static str;
    type Input: DeserializeOwned + Send + Sync + 'static;
    type Output: Serialize + Send + 'static;

    /// Rejects requests the graph cannot do anything useful with.
    fn validate(_input: &Self::Input) -> Result<(), AppError> {
        Ok(())
    }

    async fn run(
        input: &Self::Input,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Self::Output, LlmError>;
}

fn require_job_description(job_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub struct JobTitleTask;

#[async_trait]
impl AiTask for JobTitleTask {
    const NAME: &'static str = "job-title";
    type Input = JobTitleInput;
    type Output = JobTitleResponse;

    async fn run(
        input: &JobTitleInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<JobTitleResponse, LlmError> {
        let job_title = generate_job_title_graph(input, config, on_progress).await?;
        Ok(JobTitleResponse { job_title })
    }
}

pub struct SummaryTask;

#[async_trait]
impl AiTask for SummaryTask {
    const NAME: &'static str = "summary";
    type Input = SummaryInput;
    type Output = SummaryResponse;

    async fn run(
        input: &SummaryInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<SummaryResponse, LlmError> {
        let summary = generate_summary_graph(input, config, on_progress).await?;
        Ok(SummaryResponse { summary })
    }
}

pub struct CoverLetterTask;

#[async_trait]
impl AiTask for CoverLetterTask {
    const NAME: &'static str = "cover-letter";
    type Input = CoverLetterInput;
    type Output = CoverLetterResponse;

    fn validate(input: &CoverLetterInput) -> Result<(), AppError> {
        require_job_description(&input.job_description)
    }

    async fn run(
        input: &CoverLetterInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<CoverLetterResponse, LlmError> {
        let cover_letter = generate_cover_letter_graph(input, config, on_progress).await?;
        Ok(CoverLetterResponse { cover_letter })
    }
}

pub struct SortSkillsTask;

#[async_trait]
impl AiTask for SortSkillsTask {
    const NAME: &'static str = "sort-skills";
    type Input = SortSkillsInput;
    type Output = SortSkillsResponse;

    fn validate(input: &SortSkillsInput) -> Result<(), AppError> {
        require_job_description(&input.job_description)
    }

    async fn run(
        input: &SortSkillsInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<SortSkillsResponse, LlmError> {
        let ranking = sort_skills_graph(input, config, on_progress).await?;
        let skills = sort_skills::apply_skill_ranking(&ranking, &input.skills);
        Ok(SortSkillsResponse { ranking, skills })
    }
}

pub struct SortAchievementsTask;

#[async_trait]
impl AiTask for SortAchievementsTask {
    const NAME: &'static str = "sort-achievements";
    type Input = SortAchievementsInput;
    type Output = SortAchievementsResponse;

    fn validate(input: &SortAchievementsInput) -> Result<(), AppError> {
        require_job_description(&input.job_description)
    }

    async fn run(
        input: &SortAchievementsInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<SortAchievementsResponse, LlmError> {
        let ranking = sort_achievements_graph(input, config, on_progress).await?;
        let achievements = ranking.apply(&input.achievements);
        Ok(SortAchievementsResponse {
            ranked_indices: ranking.ranked_indices,
            achievements,
        })
    }
}

pub struct JobDescriptionTask;

#[async_trait]
impl AiTask for JobDescriptionTask {
    const NAME: &'static str = "job-description";
    type Input = AnalyzeJdInput;
    type Output = JobDescriptionResponse;

    fn validate(input: &AnalyzeJdInput) -> Result<(), AppError> {
        require_job_description(&input.job_description)
    }

    async fn run(
        input: &AnalyzeJdInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<JobDescriptionResponse, LlmError> {
        let job_description = analyze_job_description_graph(input, config, on_progress).await?;
        Ok(JobDescriptionResponse { job_description })
    }
}

pub struct TailorExperienceTask;

#[async_trait]
impl AiTask for TailorExperienceTask {
    const NAME: &'static str = "tailor-experience";
    type Input = TailorExperienceInput;
    type Output = TailoredExperience;

    fn validate(input: &TailorExperienceInput) -> Result<(), AppError> {
        require_job_description(&input.job_description)
    }

    async fn run(
        input: &TailorExperienceInput,
        config: &AgentConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<TailoredExperience, LlmError> {
        tailor_experience_to_jd_graph(input, config, on_progress).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/{task}
///
/// Runs the graph to completion and returns its result as JSON.
pub async fn handle_task<T: AiTask>(
    State(state): State<AppState>,
    Json(request): Json<AiRequest<T::Input>>,
) -> Result<Json<T::Output>, AppError> {
    T::validate(&request.input)?;
    let config = state.agent_for(request.agent_config)?;
    info!(task = T::NAME, provider = config.provider_label(), model = config.model(), "AI request");

    let output = T::run(&request.input, &config, None).await?;
    Ok(Json(output))
}

/// POST /api/v1/ai/{task}/stream
///
/// Streams one `progress` event per graph stage, then a single `result` or
/// `error` event. Request validation errors are returned before the stream
/// opens, as a regular JSON error.
pub async fn handle_task_stream<T: AiTask>(
    State(state): State<AppState>,
    Json(request): Json<AiRequest<T::Input>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    T::validate(&request.input)?;
    let config = state.agent_for(request.agent_config)?;
    info!(task = T::NAME, provider = config.provider_label(), model = config.model(), "AI stream request");

    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let progress_tx = tx.clone();
    let on_progress: ProgressCallback = Arc::new(move |event: ProgressEvent| {
        // A closed channel means the client went away; the graph keeps running.
        let _ = progress_tx.send(json_event("progress", &event));
    });

    let input = request.input;
    tokio::spawn(async move {
        let event = match T::run(&input, &config, Some(on_progress)).await {
            Ok(output) => json_event("result", &output),
            Err(e) => {
                let (_, code, message) = AppError::from(e).parts();
                json_event("error", &json!({ "code": code, "message": message }))
            }
        };
        let _ = tx.send(event);
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok(event), rx))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn json_event(name: &'static str, data: &impl Serialize) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|e| Event::default().event("error").data(format!("serialization failed: {e}")))
}
