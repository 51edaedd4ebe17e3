use anyhow::{bail, Context, Result};

use crate::llm_client::{AgentConfig, GeminiConfig, OpenAiCompatibleConfig};

/// Application configuration loaded from environment variables.
///
/// The server-side agent is optional: without `AI_API_KEY`, every request must
/// carry its own `agent_config`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub default_agent: Option<AgentConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_agent: default_agent_from(|key| std::env::var(key).ok())?,
        })
    }
}

/// Reads `AI_PROVIDER`, `AI_API_URL`, `AI_API_KEY` and `AI_MODEL` through `lookup`.
fn default_agent_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<AgentConfig>> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let Some(api_key) = get("AI_API_KEY") else {
        return Ok(None);
    };
    let require = |key: &str| {
        get(key).with_context(|| {
            format!("Environment variable '{key}' is required when AI_API_KEY is set")
        })
    };
    let model = require("AI_MODEL")?;
    let provider = get("AI_PROVIDER").unwrap_or_else(|| "openai-compatible".to_string());

    let agent = match provider.as_str() {
        "openai-compatible" => AgentConfig::OpenAiCompatible(OpenAiCompatibleConfig {
            api_url: require("AI_API_URL")?,
            api_key,
            model,
        }),
        "gemini" => AgentConfig::Gemini(GeminiConfig {
            api_url: get("AI_API_URL"),
            api_key,
            model,
        }),
        other => bail!("AI_PROVIDER must be 'openai-compatible' or 'gemini', got '{other}'"),
    };
    Ok(Some(agent))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_key_means_no_default_agent() {
        assert!(default_agent_from(env(&[("AI_MODEL", "gpt-4o")])).unwrap().is_none());
    }

    #[test]
    fn test_openai_compatible_default() {
        let agent = default_agent_from(env(&[
            ("AI_API_KEY", "sk-test"),
            ("AI_MODEL", "gpt-4o-mini"),
            ("AI_API_URL", "https://api.openai.com/v1"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(agent.provider_label(), "openai-compatible");
        assert_eq!(agent.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_gemini_without_url() {
        let agent = default_agent_from(env(&[
            ("AI_PROVIDER", "gemini"),
            ("AI_API_KEY", "g-key"),
            ("AI_MODEL", "gemini-1.5-flash"),
        ]))
        .unwrap()
        .unwrap();
        assert!(matches!(agent, AgentConfig::Gemini(GeminiConfig { api_url: None, .. })));
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let err = default_agent_from(env(&[("AI_API_KEY", "sk-test")])).unwrap_err();
        assert!(err.to_string().contains("AI_MODEL"));
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let result = default_agent_from(env(&[
            ("AI_PROVIDER", "anthropic"),
            ("AI_API_KEY", "k"),
            ("AI_MODEL", "m"),
        ]));
        assert!(result.is_err());
    }
}
