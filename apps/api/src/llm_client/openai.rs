//! OpenAI-compatible chat-completions client (OpenAI, OpenRouter, Ollama, vLLM, ...).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{send_with_retry, ChatMessage, ChatModel, LlmError, OpenAiCompatibleConfig};

const COMPLETIONS_PATH: &str = "/chat/completions";

pub struct OpenAiCompatibleModel {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiCompatibleModel {
    pub fn new(client: Client, config: &OpenAiCompatibleConfig) -> Result<Self, LlmError> {
        let base = config.api_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(LlmError::Config(
                "api_url is required for openai-compatible providers".to_string(),
            ));
        }
        Ok(Self {
            client,
            endpoint: completions_endpoint(base),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

/// Accepts either a base URL (`https://api.openai.com/v1`) or the full
/// completions URL.
fn completions_endpoint(base: &str) -> String {
    if base.ends_with(COMPLETIONS_PATH) {
        base.to_string()
    } else {
        format!("{base}{COMPLETIONS_PATH}")
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    fn provider(&self) -> &str {
        "openai-compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        debug!(
            "openai-compatible call: model={}, messages={}",
            self.model,
            messages.len()
        );

        let response = send_with_retry(
            || {
                self.client
                    .post(&self.endpoint)
                    .bearer_auth(&self.api_key)
                    .header("content-type", "application/json")
                    .json(&body)
            },
            parse_error_message,
        )
        .await?;

        let parsed: CompletionResponse = response.json().await?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "openai-compatible call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}
