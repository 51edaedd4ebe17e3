use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use super::tool::{describe_tools, Tool, ToolCall};
use crate::llm_client::{ChatMessage, ChatModel, LlmError, Role};

/// Conversation messages kept per agent (system prompt excluded).
pub const MAX_HISTORY: usize = 20;
/// Tool calls allowed within a single `invoke`.
pub const MAX_TOOL_ROUNDS: usize = 3;

/// A role-bound model handle: fixed system prompt, optional tools and a
/// sliding conversation window. Built fresh for every graph run.
pub struct Agent {
    name: &'static str,
    system_prompt: String,
    model: Arc<dyn ChatModel>,
    tools: Vec<Box<dyn Tool>>,
    history: VecDeque<ChatMessage>,
}

impl Agent {
    pub fn new(name: &'static str, model: Arc<dyn ChatModel>, system_prompt: impl Into<String>) -> Self {
        Self {
            name,
            system_prompt: system_prompt.into(),
            model,
            tools: Vec::new(),
            history: VecDeque::new(),
        }
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Sends `prompt` as the next user turn and returns the agent's answer,
    /// running any tool calls the agent makes along the way.
    ///
    /// Model errors propagate; tool failures never do (they come back to the
    /// agent as `valid: false` results).
    pub async fn invoke(&mut self, prompt: &str) -> Result<String, LlmError> {
        debug!(agent = self.name, "invoking agent");
        self.push(ChatMessage::user(prompt));

        let mut rounds = 0;
        loop {
            let reply = self.complete().await?;

            let Some(call) = self.tool_call(&reply) else {
                return Ok(reply);
            };

            if rounds == MAX_TOOL_ROUNDS {
                warn!(agent = self.name, "tool budget exhausted, forcing final answer");
                self.push(ChatMessage::user(
                    "Tool limit reached. Reply with your final answer now, without calling tools.",
                ));
                return self.complete().await;
            }
            rounds += 1;

            let result = match self.tools.iter().find(|t| t.name() == call.tool) {
                Some(tool) => tool.call(&call.input),
                None => crate::validation::ValidationResult::invalid(format!(
                    "Unknown tool '{}'. Available: {}",
                    call.tool,
                    self.tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
                )),
            };
            debug!(agent = self.name, tool = %call.tool, valid = result.valid, "tool call");

            let payload = serde_json::to_string(&result)?;
            self.push(ChatMessage::user(format!("TOOL RESULT {}: {payload}", call.tool)));
        }
    }

    async fn complete(&mut self) -> Result<String, LlmError> {
        let reply = self.model.complete(&self.messages()).await?;
        self.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let mut system = self.system_prompt.clone();
        if !self.tools.is_empty() {
            system.push_str(&describe_tools(&self.tools));
        }
        std::iter::once(ChatMessage::system(system))
            .chain(self.history.iter().cloned())
            .collect()
    }

    fn tool_call(&self, reply: &str) -> Option<ToolCall> {
        if self.tools.is_empty() {
            return None;
        }
        ToolCall::parse(reply)
    }

    /// Appends to the window, dropping the oldest turns past `MAX_HISTORY`.
    /// The window never starts with an assistant turn.
    fn push(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        while self.history.len() > MAX_HISTORY
            || self
                .history
                .front()
                .is_some_and(|m| m.role == Role::Assistant)
        {
            self.history.pop_front();
        }
    }
}
