//! LLM client abstraction.
//!
//! [`LlmClient`] takes a message list and returns assistant text plus optional
//! tool calls. [`ChatModel`] adapts a client into a [`Runnable`] so it can sit in
//! a chain (`prompt | model | parser`); [`StrOutputParser`] keeps only the text.
//! The executor's [`LlmDecision`](crate::executor::LlmDecision) calls a client
//! directly and turns tool calls into dispatch decisions.
//!
//! Implementations: [`MockLlm`] (scripted replies, for tests and offline demos)
//! and [`ChatCompletionsClient`] (any OpenAI-compatible `/chat/completions`
//! endpoint, e.g. Groq).

mod chat_completions;
mod mock;

pub use chat_completions::{ChatCompletionsClient, GROQ_BASE_URL};
pub use mock::MockLlm;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::message::{Message, ToolCall};
use crate::runnable::{impl_pipe_operator, Runnable};

/// Tool choice mode for chat completions: when tools are bound, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    #[default]
    Auto,
    None,
    Required,
}

impl ToolChoiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
            Self::Required => "required",
        }
    }
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            // Some providers spell "required" as "any".
            "required" | "any" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Token usage for one LLM call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from an LLM completion: assistant text and optional tool calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Assistant message content (plain text; may be empty when tools are called).
    pub content: String,
    /// Tool calls from this turn, in the order the model produced them.
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }
}

/// LLM client: given messages, returns assistant text and optional tool calls.
///
/// Tools are bound on the client itself (see
/// [`ChatCompletionsClient::with_tools`]), not passed per call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, ChainError>;
}

#[async_trait]
impl<T> LlmClient for Arc<T>
where
    T: LlmClient + ?Sized,
{
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, ChainError> {
        (**self).invoke(messages).await
    }
}

/// Runnable wrapper around an [`LlmClient`]: `Vec<Message>` in, [`LlmResponse`] out.
pub struct ChatModel {
    client: Arc<dyn LlmClient>,
    name: String,
}

impl ChatModel {
    pub fn new(client: impl LlmClient + 'static) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            name: "model".to_string(),
        }
    }

    /// Set display name (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Runnable for ChatModel {
    type Input = Vec<Message>;
    type Output = LlmResponse;

    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: Vec<Message>) -> Result<LlmResponse, ChainError> {
        let response = self.client.invoke(&input).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM usage"
            );
        }
        Ok(response)
    }
}

impl_pipe_operator!(ChatModel);

/// Keeps only the assistant text of an [`LlmResponse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

#[async_trait]
impl Runnable for StrOutputParser {
    type Input = LlmResponse;
    type Output = String;

    fn name(&self) -> &str {
        "str_output_parser"
    }

    async fn invoke(&self, input: LlmResponse) -> Result<String, ChainError> {
        Ok(input.content)
    }
}

impl_pipe_operator!(StrOutputParser);
