use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::review::{json_text, refine_structured};
use super::SortSkillsInput;
use crate::agents::{Agent, Progress, ProgressCallback};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::models::SkillGroup;
use crate::prompts::{ranking, roles};
use crate::validation::ordering::SkillRanking;
use crate::validation::parse_skill_ranking;
use crate::validation::tools::SkillsRankingTool;

const MAX_ITERATIONS: usize = 3;

pub async fn sort_skills_graph(
    input: &SortSkillsInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<SkillRanking, LlmError> {
    run_sort_skills(create_model(config)?, input, on_progress).await
}

pub async fn run_sort_skills(
    model: Arc<dyn ChatModel>,
    input: &SortSkillsInput,
    on_progress: Option<ProgressCallback>,
) -> Result<SkillRanking, LlmError> {
    let sizes: Vec<usize> = input.skills.iter().map(|g| g.skills.len()).collect();
    let mut progress = Progress::new("skills sort", on_progress);
    if sizes.len() <= 1 && sizes.iter().all(|&n| n <= 1) {
        progress.finish("Nothing to sort");
        return Ok(SkillRanking::identity(&sizes));
    }

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        task = "sort_skills",
        groups = sizes.len(),
        model = model.model(),
        "graph started"
    );

    let mut ranker = Agent::new("Skills Ranker", model.clone(), roles::skills_ranker());
    let mut reviewer = Agent::new("Skills Ranking Reviewer", model, roles::skills_reviewer())
        .with_tool(SkillsRankingTool);

    let ranked = refine_structured(
        &mut ranker,
        &mut reviewer,
        &ranking::skills_sort_prompt(&input.skills, &input.job_description),
        |reply| parse_skill_ranking(&json_text(reply), &sizes),
        |candidate| ranking::skills_review_prompt(candidate, &input.skills, &input.job_description),
        MAX_ITERATIONS,
        &mut progress,
    )
    .await?;

    let result = ranked.unwrap_or_else(|| {
        warn!(%run_id, "no valid skills ranking produced, keeping original order");
        SkillRanking::identity(&sizes)
    });

    info!(%run_id, task = "sort_skills", "graph finished");
    progress.finish("Skills sorted");
    Ok(result)
}

/// Reorders `groups` (and the skills inside them) by `ranking`.
pub fn apply_skill_ranking(ranking: &SkillRanking, groups: &[SkillGroup]) -> Vec<SkillGroup> {
    ranking.apply(
        groups,
        |group| group.skills.as_slice(),
        |group, skills| SkillGroup {
            title: group.title.clone(),
            skills,
        },
    )
}
