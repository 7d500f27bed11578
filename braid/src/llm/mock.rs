//! Mock LLM for tests and offline demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ChainError;
use crate::message::{Message, ToolCall};

use super::{LlmClient, LlmResponse};

/// Scripted LLM: returns the configured responses in order; once the script is
/// exhausted the last response repeats.
///
/// Every call's messages are recorded so tests can assert on the prompt the
/// model saw (e.g. that chat history was injected).
pub struct MockLlm {
    responses: Vec<LlmResponse>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Scripted responses; an empty script answers with empty text.
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `content` and no tool calls.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self::new(vec![LlmResponse::text(content)])
    }

    /// Always requests one call of `name` with `arguments`.
    pub fn with_tool_call(name: impl Into<String>, arguments: Value) -> Self {
        Self::new(vec![LlmResponse::tool_calls(vec![ToolCall::new(
            name, arguments,
        )])])
    }

    /// Number of `invoke` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages passed to each `invoke` call, oldest first.
    pub fn seen_messages(&self) -> Vec<Vec<Message>> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, ChainError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        let response = self
            .responses
            .get(n)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default();
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// **Scenario**: scripted responses come back in order, then the last repeats.
    #[tokio::test]
    async fn mock_llm_follows_script_then_repeats_last() {
        let llm = MockLlm::new(vec![
            LlmResponse::tool_calls(vec![ToolCall::new(
                "get_stock_price",
                json!({"symbol": "GOOGL"}),
            )]),
            LlmResponse::text("done"),
        ]);
        let first = llm.invoke(&[Message::user("q")]).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "get_stock_price");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "done");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "done");
        assert_eq!(llm.calls(), 3);
        assert_eq!(llm.seen_messages()[0], vec![Message::user("q")]);
    }

    /// **Scenario**: an empty script answers with empty text.
    #[tokio::test]
    async fn mock_llm_empty_script() {
        let llm = MockLlm::new(vec![]);
        let out = llm.invoke(&[]).await.unwrap();
        assert!(out.content.is_empty());
        assert!(out.tool_calls.is_empty());
    }
}
