//! Scripted `ChatModel` for graph tests.
//!
//! Replies are routed by agent role: a script is registered against a fragment
//! of the role's system prompt (e.g. "Summary Writer"), and each call pops the
//! next reply for that role. The last reply repeats once a script runs dry.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, ChatModel, LlmError, Role};

/// Drives a graph to completion from inside a synchronous proptest case.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[derive(Default)]
pub struct ScriptedModel {
    scripts: Mutex<HashMap<String, VecDeque<String>>>,
    failing: Mutex<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: String,
    pub messages: Vec<ChatMessage>,
}

impl RecordedCall {
    /// The newest user turn of this call.
    pub fn last_user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the replies for the role whose system prompt contains `role`.
    pub fn on(self, role: &str, replies: &[&str]) -> Self {
        self.scripts.lock().unwrap().insert(
            role.to_string(),
            replies.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    /// Makes every call for `role` fail with a 503 API error.
    pub fn failing(self, role: &str) -> Self {
        self.failing.lock().unwrap().push(role.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, role: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.role == role)
            .collect()
    }

    pub fn call_count(&self, role: &str) -> usize {
        self.calls_for(role).len()
    }

    fn resolve_role(&self, system: &str) -> Option<String> {
        let scripts = self.scripts.lock().unwrap();
        let failing = self.failing.lock().unwrap();
        scripts
            .keys()
            .chain(failing.iter())
            .filter(|key| system.contains(key.as_str()))
            .max_by_key(|key| key.len())
            .cloned()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let role = self.resolve_role(&system).unwrap_or_else(|| {
            panic!(
                "no script for system prompt: {}",
                system.chars().take(80).collect::<String>()
            )
        });

        self.calls.lock().unwrap().push(RecordedCall {
            role: role.clone(),
            messages: messages.to_vec(),
        });

        if self.failing.lock().unwrap().contains(&role) {
            return Err(LlmError::Api {
                status: 503,
                message: format!("{role} unavailable"),
            });
        }

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(&role)
            .ok_or(LlmError::EmptyContent)?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.ok_or(LlmError::EmptyContent)
    }
}
