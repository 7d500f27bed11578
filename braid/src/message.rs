//! Chat message and tool-call types.
//!
//! Message roles: System (usually first), User, Assistant, plus the two tool
//! roles the executor needs to replay a scratchpad to a model: an assistant
//! turn that requested a tool (`ToolRequest`) and the tool's answer (`Tool`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single tool invocation requested by a decision stage.
///
/// `id` correlates the request with the observation that answers it; the
/// executor assigns one when the decision stage leaves it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as registered in the `ToolRegistry`.
    pub name: String,
    /// Arguments as a JSON value (usually an object).
    pub arguments: Value,
    /// Call id, e.g. the provider's `call_abc123`.
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }

    /// Set call id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// System prompt; typically placed first in the message list.
    System(String),
    /// User input.
    User(String),
    /// Model reply.
    Assistant(String),
    /// Assistant turn that requested a tool.
    ToolRequest(ToolCall),
    /// Tool output answering the request with the same `call_id`.
    Tool { call_id: String, content: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    /// Chat-completions role name (`system`, `user`, `assistant`, `tool`).
    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant(_) | Self::ToolRequest(_) => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Text content; a tool request renders as its name and arguments.
    pub fn content(&self) -> String {
        match self {
            Self::System(s) | Self::User(s) | Self::Assistant(s) => s.clone(),
            Self::ToolRequest(tc) => format!("{}({})", tc.name, tc.arguments),
            Self::Tool { content, .. } => content.clone(),
        }
    }
}

/// Text form of a JSON value: strings render without quotes, everything else
/// as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
