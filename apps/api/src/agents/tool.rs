use serde::Deserialize;
use serde_json::Value;

use crate::validation::ValidationResult;

/// A deterministic check an agent may call mid-conversation.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Example `input` object shown to the model.
    fn input_example(&self) -> &'static str;

    fn call(&self, input: &Value) -> ValidationResult;
}

/// `{"tool": "<name>", "input": {...}}`: the whole reply, nothing else.
#[derive(Debug, Deserialize)]
pub(crate) struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub input: Value,
}

impl ToolCall {
    /// The whole reply (optionally fenced) must be the JSON object; prose around
    /// it means the agent is answering, not calling.
    pub(crate) fn parse(reply: &str) -> Option<Self> {
        let body = crate::llm_client::strip_json_fences(reply);
        if !body.starts_with('{') {
            return None;
        }
        serde_json::from_str::<ToolCall>(body).ok()
    }
}

/// Tool section appended to the system prompt of agents that carry tools.
pub(crate) fn describe_tools(tools: &[Box<dyn Tool>]) -> String {
    let mut section = String::from(
        "\n\nTOOLS\nYou may call a validation tool before giving your verdict. \
         To call one, reply with ONLY this JSON object and nothing else:\n\
         {\"tool\": \"<tool name>\", \"input\": { ... }}\n\
         The result comes back as {\"valid\": bool, \"issues\": [...]}. \
         Treat it as evidence: you still decide the verdict.\n",
    );
    for tool in tools {
        section.push_str(&format!(
            "- {}: {} Input example: {}\n",
            tool.name(),
            tool.description(),
            tool.input_example()
        ));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_call() {
        let call = ToolCall::parse(r#"{"tool": "validate_sort_order", "input": {"sort_order": "[0]", "expected_length": 1}}"#)
            .unwrap();
        assert_eq!(call.tool, "validate_sort_order");
        assert_eq!(call.input["expected_length"], 1);
    }

    #[test]
    fn test_parse_fenced_tool_call() {
        let call = ToolCall::parse("```json\n{\"tool\": \"validate_jd_format\", \"input\": {}}\n```");
        assert!(call.is_some());
    }

    #[test]
    fn test_prose_is_not_a_tool_call() {
        assert!(ToolCall::parse("APPROVED").is_none());
        assert!(ToolCall::parse("CRITIQUE: bad\n{\"tool\": \"x\"}").is_none());
        assert!(ToolCall::parse("[1, 0]").is_none());
    }

    #[test]
    fn test_object_without_tool_key_is_not_a_call() {
        assert!(ToolCall::parse(r#"{"group_order": [0]}"#).is_none());
    }
}
