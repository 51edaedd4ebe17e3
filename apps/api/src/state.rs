use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::AgentConfig;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds no model handles: every graph run builds its own from the request's
/// `agent_config` (or the server default).
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The request's agent settings, falling back to the server default.
    pub fn agent_for(&self, requested: Option<AgentConfig>) -> Result<AgentConfig, AppError> {
        requested
            .or_else(|| self.config.default_agent.clone())
            .ok_or_else(|| {
                AppError::Validation(
                    "agent_config is required: no default AI provider is configured on the server"
                        .to_string(),
                )
            })
    }
}
