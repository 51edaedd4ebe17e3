//! Experience tailoring: the one multi-stage graph.
//!
//! 1. analysis: JD keywords this role can credibly claim, plus a focus line
//! 2. achievements: enrichment classification, then scribe ⇄ integrity auditor
//! 3. tech stack: aligner (self-checking with the tech-stack tool) gated by
//!    `validate_tech_stack`
//! 4. description: writer → fact checker → relevance evaluator, where a
//!    relevance critique sends the description back to the writer
//!
//! Every stage has a deterministic fallback to the original data, so the
//! result always has as many achievements as the input.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::review::refine_structured;
use super::TailorExperienceInput;
use crate::agents::{
    extract_json, extract_json_or, parse_verdict, strip_markdown, Agent, Progress,
    ProgressCallback, Verdict,
};
use crate::llm_client::{create_model, AgentConfig, ChatModel, LlmError};
use crate::models::WorkExperience;
use crate::prompts::{experience, revision_prompt, roles, validation_failed_prompt};
use crate::validation::tools::{AchievementsTool, DescriptionTool, TechStackTool};
use crate::validation::{
    validate_achievements, validate_description, validate_tech_stack, ValidationResult,
};

/// Bound for each refinement loop in the pipeline.
const MAX_ITERATIONS: usize = 2;
const MAX_KEYWORDS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailoredExperience {
    pub description: String,
    pub achievements: Vec<String>,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ExperienceAnalysis {
    keywords: Vec<String>,
    focus: String,
}

impl ExperienceAnalysis {
    /// Trimmed, case-insensitively unique, capped keywords.
    fn normalized(self) -> Self {
        let mut keywords: Vec<String> = Vec::new();
        for keyword in self.keywords {
            let keyword = keyword.trim();
            if keyword.is_empty() || keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
                continue;
            }
            keywords.push(keyword.to_string());
        }
        keywords.truncate(MAX_KEYWORDS);
        Self {
            keywords,
            focus: self.focus.trim().to_string(),
        }
    }
}

/// What every stage is tailoring towards.
struct Target<'a> {
    job: &'a WorkExperience,
    analysis: &'a ExperienceAnalysis,
    job_description: &'a str,
}

pub async fn tailor_experience_to_jd_graph(
    input: &TailorExperienceInput,
    config: &AgentConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<TailoredExperience, LlmError> {
    run_tailor_experience(create_model(config)?, input, on_progress).await
}

pub async fn run_tailor_experience(
    model: Arc<dyn ChatModel>,
    input: &TailorExperienceInput,
    on_progress: Option<ProgressCallback>,
) -> Result<TailoredExperience, LlmError> {
    let job = &input.experience;
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        task = "tailor_experience",
        provider = model.provider(),
        model = model.model(),
        company = %job.company,
        achievements = job.achievements.len(),
        "graph started"
    );
    let mut progress = Progress::new("experience tailoring", on_progress);

    progress.update("Analyzing experience against the job description");
    let mut analyst = Agent::new("Experience Analyst", model.clone(), roles::experience_analyst());
    let reply = analyst
        .invoke(&experience::experience_analysis_prompt(job, &input.job_description))
        .await?;
    let analysis = extract_json_or(&reply, ExperienceAnalysis::default(), "experience analysis")
        .normalized();
    debug!(%run_id, keywords = ?analysis.keywords, "analysis complete");

    let target = Target {
        job,
        analysis: &analysis,
        job_description: &input.job_description,
    };

    let achievements = if job.achievements.is_empty() {
        Vec::new()
    } else {
        rewrite_achievements(&model, &target, &mut progress).await?
    };

    let tech_stack = if job.tech_stack.is_empty() {
        Vec::new()
    } else {
        align_tech_stack(&model, &target, &mut progress).await?
    };

    let description = rewrite_description(&model, &target, &mut progress).await?;

    info!(%run_id, task = "tailor_experience", "graph finished");
    progress.finish("Experience tailored");
    Ok(TailoredExperience {
        description,
        achievements,
        tech_stack,
    })
}

// ── Stage 2: achievements ───────────────────────────────────────────────────

async fn rewrite_achievements(
    model: &Arc<dyn ChatModel>,
    target: &Target<'_>,
    progress: &mut Progress,
) -> Result<Vec<String>, LlmError> {
    let original = &target.job.achievements;
    let allowed = classify_enrichment(model, original, &target.analysis.keywords, progress).await?;

    let mut scribe = Agent::new("Achievement Scribe", model.clone(), roles::achievement_scribe());
    let mut auditor = Agent::new("Integrity Auditor", model.clone(), roles::integrity_auditor())
        .with_tool(AchievementsTool);

    let rewritten = refine_structured(
        &mut scribe,
        &mut auditor,
        &experience::scribe_prompt(
            target.job,
            &allowed,
            &target.analysis.focus,
            target.job_description,
        ),
        |reply| parse_achievements(reply, original),
        |candidate| experience::integrity_prompt(original, candidate),
        MAX_ITERATIONS,
        progress,
    )
    .await?;

    Ok(match rewritten {
        Some(list) => list.iter().map(|a| strip_markdown(a)).collect(),
        None => {
            warn!("no rewrite passed the integrity checks, keeping original achievements");
            original.clone()
        }
    })
}

/// Asks which analysed keywords each achievement already demonstrates. Skipped
/// when the analysis found none.
async fn classify_enrichment(
    model: &Arc<dyn ChatModel>,
    achievements: &[String],
    keywords: &[String],
    progress: &mut Progress,
) -> Result<BTreeMap<usize, Vec<String>>, LlmError> {
    if keywords.is_empty() {
        return Ok(BTreeMap::new());
    }

    progress.update("Classifying which keywords each achievement supports");
    let mut classifier =
        Agent::new("Enrichment Classifier", model.clone(), roles::enrichment_classifier());
    let reply = classifier
        .invoke(&experience::enrichment_prompt(achievements, keywords))
        .await?;
    let raw: HashMap<String, Vec<String>> =
        extract_json_or(&reply, HashMap::new(), "enrichment classification");
    Ok(filter_enrichment(raw, achievements.len(), keywords))
}

/// Keeps valid indices and analysed keywords only, in the analysis' spelling.
fn filter_enrichment(
    raw: HashMap<String, Vec<String>>,
    count: usize,
    keywords: &[String],
) -> BTreeMap<usize, Vec<String>> {
    raw.into_iter()
        .filter_map(|(key, words)| {
            let index = key.trim().parse::<usize>().ok().filter(|&i| i < count)?;
            let mut kept: Vec<String> = Vec::new();
            for word in words {
                if let Some(keyword) = keywords.iter().find(|k| k.eq_ignore_ascii_case(word.trim())) {
                    if !kept.contains(keyword) {
                        kept.push(keyword.clone());
                    }
                }
            }
            (!kept.is_empty()).then_some((index, kept))
        })
        .collect()
}

fn parse_achievements(reply: &str, original: &[String]) -> Result<Vec<String>, ValidationResult> {
    let Some(rewritten) = extract_json::<Vec<String>>(reply) else {
        return Err(ValidationResult::invalid(
            "Achievements must be a JSON array of strings",
        ));
    };
    let check = validate_achievements(original, &rewritten);
    if check.valid {
        Ok(rewritten)
    } else {
        Err(check)
    }
}

// ── Stage 3: tech stack ─────────────────────────────────────────────────────

async fn align_tech_stack(
    model: &Arc<dyn ChatModel>,
    target: &Target<'_>,
    progress: &mut Progress,
) -> Result<Vec<String>, LlmError> {
    let original = &target.job.tech_stack;
    let mut aligner = Agent::new("Tech Stack Aligner", model.clone(), roles::tech_stack_aligner())
        .with_tool(TechStackTool);
    let mut prompt = experience::tech_alignment_prompt(
        original,
        &target.analysis.keywords,
        target.job_description,
    );

    for attempt in 1..=MAX_ITERATIONS {
        progress.update(format!("Aligning tech stack (attempt {attempt}/{MAX_ITERATIONS})"));
        let reply = aligner.invoke(&prompt).await?;

        let check = match extract_json::<Vec<String>>(&reply) {
            Some(proposed) if proposed.is_empty() => {
                ValidationResult::invalid("Tech stack must not be empty")
            }
            Some(proposed) => {
                let check = validate_tech_stack(original, &proposed);
                if check.valid {
                    return Ok(proposed.into_iter().map(|t| t.trim().to_string()).collect());
                }
                check
            }
            None => ValidationResult::invalid("Tech stack must be a JSON array of strings"),
        };
        debug!(attempt, issues = ?check.issues, "tech stack rejected");

        if attempt < MAX_ITERATIONS {
            prompt = validation_failed_prompt(&check.issues_as_list());
        }
    }

    warn!("no valid tech stack alignment, keeping original order");
    Ok(original.clone())
}

// ── Stage 4: description ────────────────────────────────────────────────────

enum DescriptionReview {
    /// Factually sound and relevant.
    Approved(String),
    /// Factually sound, but the evaluator wants it more targeted.
    Unfocused { text: String, reason: String },
    /// Failed validation or fact-check; carries the writer's next prompt.
    Rejected(String),
}

async fn rewrite_description(
    model: &Arc<dyn ChatModel>,
    target: &Target<'_>,
    progress: &mut Progress,
) -> Result<String, LlmError> {
    let mut writer = Agent::new("Description Writer", model.clone(), roles::description_writer());
    let mut fact_checker =
        Agent::new("Fact Checker", model.clone(), roles::fact_checker()).with_tool(DescriptionTool);
    let mut evaluator =
        Agent::new("Relevance Evaluator", model.clone(), roles::relevance_evaluator());

    let mut prompt = experience::description_prompt(
        target.job,
        &target.analysis.focus,
        target.job_description,
    );
    let mut usable: Option<String> = None;

    for round in 1..=MAX_ITERATIONS {
        progress.update(format!("Writing role description (round {round}/{MAX_ITERATIONS})"));
        let draft = strip_markdown(&writer.invoke(&prompt).await?);

        let next_prompt =
            match review_description(&mut fact_checker, &mut evaluator, target, draft, progress)
                .await?
            {
                DescriptionReview::Approved(text) => return Ok(text),
                DescriptionReview::Unfocused { text, reason } => {
                    usable = Some(text);
                    revision_prompt(&reason)
                }
                DescriptionReview::Rejected(next) => next,
            };

        if round < MAX_ITERATIONS {
            prompt = next_prompt;
        }
    }

    Ok(usable.unwrap_or_else(|| {
        warn!("no description rewrite passed review, keeping the original");
        target.job.description.clone()
    }))
}

async fn review_description(
    fact_checker: &mut Agent,
    evaluator: &mut Agent,
    target: &Target<'_>,
    draft: String,
    progress: &mut Progress,
) -> Result<DescriptionReview, LlmError> {
    let original = &target.job.description;
    let check = validate_description(original, &draft);
    if !check.valid {
        return Ok(DescriptionReview::Rejected(validation_failed_prompt(
            &check.issues_as_list(),
        )));
    }

    progress.update("Fact-checking role description");
    let verdict = parse_verdict(
        &fact_checker
            .invoke(&experience::fact_check_prompt(target.job, &draft))
            .await?,
    );
    let draft = match verdict {
        Verdict::Approved => draft,
        Verdict::Critique {
            correction: Some(fixed),
            ..
        } if validate_description(original, &strip_markdown(&fixed)).valid => {
            strip_markdown(&fixed)
        }
        Verdict::Critique { reason, .. } => {
            return Ok(DescriptionReview::Rejected(revision_prompt(&reason)))
        }
    };

    progress.update("Evaluating relevance to the job description");
    let verdict = parse_verdict(
        &evaluator
            .invoke(&experience::relevance_prompt(
                &draft,
                &target.analysis.focus,
                target.job_description,
            ))
            .await?,
    );
    Ok(match verdict {
        Verdict::Approved => DescriptionReview::Approved(draft),
        Verdict::Critique { reason, .. } => DescriptionReview::Unfocused {
            text: draft,
            reason,
        },
    })
}
