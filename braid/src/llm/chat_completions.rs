//! OpenAI-compatible chat completions client (OpenAI, Groq, local servers).
//!
//! Request: `POST {base_url}/chat/completions` with `model`, `messages` and,
//! when tools are bound, `tools` + `tool_choice`. Response: the first choice's
//! `message.content` and `message.tool_calls`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ChainError;
use crate::message::{Message, ToolCall};
use crate::tools::ToolSpec;

use super::{LlmClient, LlmResponse, LlmUsage, ToolChoiceMode};

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Chat completions over HTTP.
///
/// ```no_run
/// use braid::llm::{ChatCompletionsClient, ToolChoiceMode};
///
/// let client = ChatCompletionsClient::new("https://api.groq.com/openai/v1", "llama-3.3-70b-versatile")
///     .with_api_key(std::env::var("OPENAI_API_KEY").unwrap_or_default())
///     .with_tool_choice(ToolChoiceMode::Required);
/// ```
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    timeout: Option<Duration>,
    tools: Vec<ToolSpec>,
    tool_choice: ToolChoiceMode,
}

impl ChatCompletionsClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: None,
            timeout: None,
            tools: Vec::new(),
            tool_choice: ToolChoiceMode::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bind tools; their specs are sent with every request.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = mode;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// JSON request body for `messages`.
    pub fn request_body(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(message_to_json).collect::<Vec<_>>(),
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = self.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if !self.tools.is_empty() {
                let tools: Vec<Value> = self
                    .tools
                    .iter()
                    .map(|spec| {
                        json!({
                            "type": "function",
                            "function": {
                                "name": spec.name,
                                "description": spec.description.clone().unwrap_or_default(),
                                "parameters": spec.input_schema,
                            }
                        })
                    })
                    .collect();
                obj.insert("tools".to_string(), Value::Array(tools));
                obj.insert("tool_choice".to_string(), json!(self.tool_choice.as_str()));
            }
        }
        body
    }
}

fn message_to_json(message: &Message) -> Value {
    match message {
        Message::System(c) => json!({"role": "system", "content": c}),
        Message::User(c) => json!({"role": "user", "content": c}),
        Message::Assistant(c) => json!({"role": "assistant", "content": c}),
        Message::ToolRequest(call) => json!({
            "role": "assistant",
            "content": Value::Null,
            "tool_calls": [{
                "id": call.id.clone().unwrap_or_default(),
                "type": "function",
                "function": {
                    "name": call.name,
                    "arguments": call.arguments.to_string(),
                }
            }]
        }),
        Message::Tool { call_id, content } => json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content,
        }),
    }
}

/// Parses tool-call arguments, which providers send as a JSON-encoded string.
/// Unparseable arguments become an empty object so the tool reports the
/// missing fields itself.
fn parse_tool_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str::<Value>(raw) {
        // Some models double-encode: "\"{...}\"".
        Ok(Value::String(inner)) => serde_json::from_str(&inner).unwrap_or_else(|_| json!({})),
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, raw = raw, "Unparseable tool arguments; using {{}}");
            json!({})
        }
    }
}

/// Parses a chat completions response body.
pub fn parse_response(body: &Value) -> Result<LlmResponse, ChainError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| ChainError::stage("chat completions response has no choices"))?;

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(|t| t.as_array())
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let function = call.get("function")?;
                    let name = function.get("name")?.as_str()?;
                    let arguments = match function.get("arguments") {
                        Some(Value::String(raw)) => parse_tool_arguments(raw),
                        Some(v) => v.clone(),
                        None => json!({}),
                    };
                    let mut tc = ToolCall::new(name, arguments);
                    tc.id = call.get("id").and_then(|i| i.as_str()).map(String::from);
                    Some(tc)
                })
                .collect()
        })
        .unwrap_or_default();

    let usage = body
        .get("usage")
        .and_then(|u| serde_json::from_value::<LlmUsage>(u.clone()).ok());

    Ok(LlmResponse {
        content,
        tool_calls,
        usage,
    })
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, ChainError> {
        let body = self.request_body(messages);
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            tools = self.tools.len(),
            "Chat completions request"
        );

        let mut req = self.http.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let res = req
            .send()
            .await
            .map_err(|e| ChainError::stage(format!("chat completions transport: {}", e)))?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            return Err(ChainError::stage(format!(
                "chat completions API error {}: {}",
                status, err_body
            )));
        }
        let out: Value = res
            .json()
            .await
            .map_err(|e| ChainError::stage(format!("chat completions decode: {}", e)))?;
        parse_response(&out)
    }
}
