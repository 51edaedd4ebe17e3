pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::graphs::handlers::{
    handle_task, handle_task_stream, AiTask, CoverLetterTask, JobDescriptionTask, JobTitleTask,
    SortAchievementsTask, SortSkillsTask, SummaryTask, TailorExperienceTask,
};
use crate::state::AppState;

/// Mounts `T` at `/api/v1/ai/{name}` and its SSE twin at `.../stream`.
fn with_task<T: AiTask>(router: Router<AppState>) -> Router<AppState> {
    let path = format!("/api/v1/ai/{}", T::NAME);
    router
        .route(&format!("{path}/stream"), post(handle_task_stream::<T>))
        .route(&path, post(handle_task::<T>))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new().route("/health", get(health::health_handler));

    // AI API
    let router = with_task::<JobTitleTask>(router);
    let router = with_task::<SummaryTask>(router);
    let router = with_task::<CoverLetterTask>(router);
    let router = with_task::<SortSkillsTask>(router);
    let router = with_task::<SortAchievementsTask>(router);
    let router = with_task::<JobDescriptionTask>(router);
    let router = with_task::<TailorExperienceTask>(router);

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mockito::Matcher;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    fn app() -> Router {
        build_router(AppState::new(Config {
            port: 0,
            rust_log: "info".to_string(),
            default_agent: None,
        }))
    }

    fn agent_config(api_url: &str, api_key: &str) -> Value {
        json!({
            "provider_type": "openai-compatible",
            "api_url": api_url,
            "api_key": api_key,
            "model": "test-model"
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn error_code(body: &str) -> String {
        let value: Value = serde_json::from_str(body).unwrap();
        value["error"]["code"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["service"], "tailor-api");
    }

    #[tokio::test]
    async fn test_missing_agent_config_without_default_is_rejected() {
        let (status, body) = post_json(
            app(),
            "/api/v1/ai/summary",
            json!({ "resume": {}, "job_description": "Rust engineer" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
        assert!(body.contains("agent_config"));
    }

    #[tokio::test]
    async fn test_empty_job_description_is_rejected_before_any_call() {
        let (status, body) = post_json(
            app(),
            "/api/v1/ai/job-description",
            json!({
                "job_description": "   ",
                "agent_config": agent_config("http://127.0.0.1:9", "k")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_api_key_is_invalid_agent_config() {
        let (status, body) = post_json(
            app(),
            "/api/v1/ai/sort-achievements",
            json!({
                "achievements": ["Shipped it"],
                "job_description": "Rust engineer",
                "agent_config": agent_config("http://127.0.0.1:9", "")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "INVALID_AGENT_CONFIG");
    }

    #[tokio::test]
    async fn test_single_achievement_needs_no_model_call() {
        // Nothing listens on port 9; any request to the provider would fail.
        let (status, body) = post_json(
            app(),
            "/api/v1/ai/sort-achievements",
            json!({
                "achievements": ["Cut p99 latency by 40%"],
                "job_description": "Rust engineer",
                "agent_config": agent_config("http://127.0.0.1:9", "k")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["ranked_indices"], json!([0]));
        assert_eq!(value["achievements"], json!(["Cut p99 latency by 40%"]));
    }

    #[tokio::test]
    async fn test_stream_emits_progress_then_result() {
        let (status, body) = post_json(
            app(),
            "/api/v1/ai/sort-achievements/stream",
            json!({
                "achievements": ["Cut p99 latency by 40%"],
                "job_description": "Rust engineer",
                "agent_config": agent_config("http://127.0.0.1:9", "k")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let progress = body.find("event: progress").unwrap();
        let result = body.find("event: result").unwrap();
        assert!(progress < result);
        assert!(body.contains(r#""done":true"#));
    }

    #[tokio::test]
    async fn test_stream_reports_provider_failure_as_error_event() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let (status, body) = post_json(
            app(),
            "/api/v1/ai/summary/stream",
            json!({
                "resume": {},
                "job_description": "Rust engineer",
                "agent_config": agent_config(&server.url(), "bad-key")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let closed = body.find(r#""done":true"#).unwrap();
        let error = body.find("event: error").unwrap();
        assert!(closed < error);
        assert!(!body.contains("event: result"));

        let error_data = body[error..]
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap();
        let value: Value = serde_json::from_str(error_data).unwrap();
        assert_eq!(value["code"], "LLM_ERROR");
        assert!(value["message"].as_str().unwrap().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_rate_limited_provider_is_429() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let (status, body) = post_json(
            app(),
            "/api/v1/ai/summary",
            json!({
                "resume": {},
                "job_description": "Rust engineer",
                "agent_config": agent_config(&server.url(), "k")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error_code(&body), "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_stream_rejects_invalid_request_as_json_error() {
        let (status, body) = post_json(
            app(),
            "/api/v1/ai/tailor-experience/stream",
            json!({ "experience": {}, "job_description": "" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }

    fn completion(content: &str) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
    }

    #[tokio::test]
    async fn test_job_title_end_to_end_against_provider() {
        let mut server = mockito::Server::new_async().await;
        let writer = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("You are the Job Title Writer".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("**Senior Rust Engineer**"))
            .expect(1)
            .create_async()
            .await;
        let reviewer = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("You are the Job Title Reviewer".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("APPROVED"))
            .expect(1)
            .create_async()
            .await;

        let (status, body) = post_json(
            app(),
            "/api/v1/ai/job-title",
            json!({
                "resume": { "personal": { "name": "Ada", "position": "Software Engineer" } },
                "job_description": "Senior Rust Engineer, distributed storage",
                "agent_config": agent_config(&server.url(), "test-key")
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["job_title"], "Senior Rust Engineer");
        writer.assert_async().await;
        reviewer.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_auth_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let (status, body) = post_json(
            app(),
            "/api/v1/ai/summary",
            json!({
                "resume": {},
                "job_description": "Rust engineer",
                "agent_config": agent_config(&server.url(), "bad-key")
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(error_code(&body), "LLM_ERROR");
        assert!(body.contains("Incorrect API key provided"));
    }
}
