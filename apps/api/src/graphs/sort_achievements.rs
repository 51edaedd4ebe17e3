use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::review::{json_text, refine_structured};
use super::SortAchievementsInput;
use crate::agents::{Agent, Progress, ProgressCallback};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::prompts::{ranking, roles};
use crate::validation::parse_sort_order;
use crate::validation::tools::SortOrderTool;

const MAX_ITERATIONS: usize = 3;

/// Always a permutation of `0..n` for the `n` achievements sent in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRanking {
    pub ranked_indices: Vec<usize>,
}

impl AchievementRanking {
    pub fn identity(n: usize) -> Self {
        Self {
            ranked_indices: (0..n).collect(),
        }
    }

    /// The items in ranked order.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.ranked_indices
            .iter()
            .filter_map(|&i| items.get(i).cloned())
            .collect()
    }
}

pub async fn sort_achievements_graph(
    input: &SortAchievementsInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<AchievementRanking, LlmError> {
    run_sort_achievements(create_model(config)?, input, on_progress).await
}

pub async fn run_sort_achievements(
    model: Arc<dyn ChatModel>,
    input: &SortAchievementsInput,
    on_progress: Option<ProgressCallback>,
) -> Result<AchievementRanking, LlmError> {
    let n = input.achievements.len();
    let mut progress = Progress::new("achievement sort", on_progress);
    if n <= 1 {
        progress.finish("Nothing to sort");
        return Ok(AchievementRanking::identity(n));
    }

    let run_id = Uuid::new_v4();
    info!(%run_id, task = "sort_achievements", items = n, model = model.model(), "graph started");

    let mut ranker = Agent::new("Achievement Ranker", model.clone(), roles::achievement_ranker());
    let mut reviewer = Agent::new("Achievement Ranking Reviewer", model, roles::achievement_reviewer())
        .with_tool(SortOrderTool);

    let ranked = refine_structured(
        &mut ranker,
        &mut reviewer,
        &ranking::achievements_sort_prompt(&input.achievements, &input.job_description),
        |reply| parse_sort_order(&json_text(reply), n),
        |order| ranking::achievements_review_prompt(order, &input.achievements, &input.job_description),
        MAX_ITERATIONS,
        &mut progress,
    )
    .await?;

    let result = match ranked {
        Some(ranked_indices) => AchievementRanking { ranked_indices },
        None => {
            warn!(%run_id, "no valid achievement order produced, keeping original order");
            AchievementRanking::identity(n)
        }
    };

    info!(%run_id, task = "sort_achievements", "graph finished");
    progress.finish("Achievements sorted");
    Ok(result)
}
