//! LLM client: provider-neutral chat models used by every agent in Tailor.
//!
//! ARCHITECTURAL RULE: agents never talk to a provider directly.
//! They hold an `Arc<dyn ChatModel>` built by `create_model` from the caller's
//! `AgentConfig`, so one graph run is bound to exactly one provider/credential pair.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod gemini;
pub mod openai;
pub mod prompts;

#[cfg(test)]
pub mod testing;

pub use gemini::GeminiModel;
pub use openai::OpenAiCompatibleModel;

/// Raw API calls elsewhere in the product use the same fixed timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Invalid model configuration: {0}")]
    Config(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Messages
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The one capability every provider exposes to the agent layer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider label for logs ("openai-compatible", "gemini").
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    /// Sends the conversation and returns the assistant's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiCompatibleConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Settings for Google Gemini. `api_url` defaults to the public v1beta endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    pub api_key: String,
    pub model: String,
}

/// User-supplied provider settings. Immutable for the duration of one graph run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider_type")]
pub enum AgentConfig {
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible(OpenAiCompatibleConfig),
    #[serde(rename = "gemini")]
    Gemini(GeminiConfig),
}

impl AgentConfig {
    pub fn provider_label(&self) -> &'static str {
        match self {
            AgentConfig::OpenAiCompatible(_) => "openai-compatible",
            AgentConfig::Gemini(_) => "gemini",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            AgentConfig::OpenAiCompatible(c) => &c.model,
            AgentConfig::Gemini(c) => &c.model,
        }
    }

    fn api_key(&self) -> &str {
        match self {
            AgentConfig::OpenAiCompatible(c) => &c.api_key,
            AgentConfig::Gemini(c) => &c.api_key,
        }
    }
}

impl fmt::Debug for OpenAiCompatibleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Factory
// ────────────────────────────────────────────────────────────────────────────

/// Builds the chat model for `config` with the default request timeout.
pub fn create_model(config: &AgentConfig) -> Result<Arc<dyn ChatModel>, LlmError> {
    create_model_with_timeout(config, DEFAULT_TIMEOUT)
}

/// Builds the chat model for `config`. Pure construction: nothing is sent until
/// an agent calls `complete`, so bad URLs or keys surface on first use.
pub fn create_model_with_timeout(
    config: &AgentConfig,
    timeout: Duration,
) -> Result<Arc<dyn ChatModel>, LlmError> {
    if config.model().trim().is_empty() {
        return Err(LlmError::Config("model id must not be empty".to_string()));
    }
    if config.api_key().trim().is_empty() {
        return Err(LlmError::Config("API key must not be empty".to_string()));
    }

    let client = Client::builder().timeout(timeout).build()?;

    let model: Arc<dyn ChatModel> = match config {
        AgentConfig::OpenAiCompatible(c) => Arc::new(OpenAiCompatibleModel::new(client, c)?),
        AgentConfig::Gemini(c) => Arc::new(GeminiModel::new(client, c)),
    };
    Ok(model)
}

// ────────────────────────────────────────────────────────────────────────────
// Transport helpers shared by the providers
// ────────────────────────────────────────────────────────────────────────────

/// Sends a request built by `build`, retrying 429 and 5xx with exponential
/// backoff (1s, 2s). Other non-success statuses return immediately, with the
/// message pulled out by `error_message` when the body is a provider error.
pub(crate) async fn send_with_retry<F>(
    build: F,
    error_message: fn(&str) -> Option<String>,
) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        return Ok(response);
    }

    // Exhausted retries on 429 means the provider is throttling us.
    Err(match last_error {
        Some(LlmError::Api { status: 429, .. }) | None => LlmError::RateLimited {
            retries: MAX_RETRIES,
        },
        Some(e) => e,
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_config() -> AgentConfig {
        AgentConfig::OpenAiCompatible(OpenAiCompatibleConfig {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: "sk-secret-value".to_string(),
            model: "gpt-4o-mini".to_string(),
        })
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n[1, 2]\n```";
        assert_eq!(strip_json_fences(input), "[1, 2]");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_agent_config_deserializes_openai_compatible() {
        let json = r#"{
            "provider_type": "openai-compatible",
            "api_url": "http://localhost:11434/v1",
            "api_key": "ollama",
            "model": "llama3.1"
        }"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.provider_label(), "openai-compatible");
        assert_eq!(config.model(), "llama3.1");
    }

    #[test]
    fn test_agent_config_deserializes_gemini_without_url() {
        let json = r#"{"provider_type": "gemini", "api_key": "k", "model": "gemini-2.0-flash"}"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        match config {
            AgentConfig::Gemini(g) => {
                assert!(g.api_url.is_none());
                assert_eq!(g.model, "gemini-2.0-flash");
            }
            other => panic!("expected gemini config, got {other:?}"),
        }
    }

    #[test]
    fn test_agent_config_rejects_unknown_provider() {
        let json = r#"{"provider_type": "anthropic", "api_key": "k", "model": "m"}"#;
        assert!(serde_json::from_str::<AgentConfig>(json).is_err());
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let rendered = format!("{:?}", openai_config());
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_create_model_dispatches_by_provider() {
        let model = create_model(&openai_config()).unwrap();
        assert_eq!(model.provider(), "openai-compatible");
        assert_eq!(model.model(), "gpt-4o-mini");

        let gemini = AgentConfig::Gemini(GeminiConfig {
            api_url: None,
            api_key: "g-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
        });
        let model = create_model(&gemini).unwrap();
        assert_eq!(model.provider(), "gemini");
    }

    #[test]
    fn test_create_model_rejects_empty_model_id() {
        let config = AgentConfig::OpenAiCompatible(OpenAiCompatibleConfig {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: "k".to_string(),
            model: "  ".to_string(),
        });
        assert!(matches!(create_model(&config), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_create_model_rejects_empty_api_key() {
        let config = AgentConfig::Gemini(GeminiConfig {
            api_url: None,
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
        });
        assert!(matches!(create_model(&config), Err(LlmError::Config(_))));
    }
}
