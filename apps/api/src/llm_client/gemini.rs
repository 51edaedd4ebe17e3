//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{send_with_retry, ChatMessage, ChatModel, GeminiConfig, LlmError, Role};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiModel {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiModel {
    pub fn new(client: Client, config: &GeminiConfig) -> Self {
        let base_url = config
            .api_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .unwrap_or(GEMINI_API_BASE)
            .to_string();
        Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    /// Splits the system prompt out into `systemInstruction`; Gemini names the
    /// assistant role "model".
    fn to_request(messages: &[ChatMessage]) -> GenerateRequest {
        let system: Vec<Part> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| Part {
                text: m.content.clone(),
            })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateRequest {
            contents,
            system_instruction: (!system.is_empty()).then_some(Content {
                role: None,
                parts: system,
            }),
        }
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = Self::to_request(messages);
        let endpoint = self.endpoint();

        debug!("gemini call: model={}, messages={}", self.model, messages.len());

        let response = send_with_retry(
            || {
                self.client
                    .post(&endpoint)
                    .header("x-goog-api-key", &self.api_key)
                    .header("content-type", "application/json")
                    .json(&body)
            },
            parse_error_message,
        )
        .await?;

        let parsed: GenerateResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn model_for(url: Option<String>) -> GeminiModel {
        GeminiModel::new(
            Client::new(),
            &GeminiConfig {
                api_url: url,
                api_key: "g-key".to_string(),
                model: "gemini-2.0-flash".to_string(),
            },
        )
    }

    #[test]
    fn test_default_endpoint() {
        let model = model_for(None);
        assert_eq!(
            model.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_blank_url_falls_back_to_default() {
        let model = model_for(Some("   ".to_string()));
        assert!(model.endpoint().starts_with(GEMINI_API_BASE));
    }

    #[test]
    fn test_request_moves_system_prompt_and_renames_assistant() {
        let request = GeminiModel::to_request(&[
            ChatMessage::system("Be brief."),
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello"),
        ]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"].as_array().unwrap().len(), 2);
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
    }

    #[test]
    fn test_request_without_system_prompt_omits_instruction() {
        let request = GeminiModel::to_request(&[ChatMessage::user("Hi")]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[tokio::test]
    async fn test_complete_joins_candidate_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "g-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Title?"}]}]
            })))
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Senior "},{"text":"Engineer"}]}}]}"#,
            )
            .create_async()
            .await;

        let model = model_for(Some(format!("{}/models", server.url())));
        let text = model.complete(&[ChatMessage::user("Title?")]).await.unwrap();

        assert_eq!(text, "Senior Engineer");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_bad_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let model = model_for(Some(server.url()));
        let err = model.complete(&[ChatMessage::user("x")]).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_without_candidates_is_empty_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let model = model_for(Some(server.url()));
        let err = model.complete(&[ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
