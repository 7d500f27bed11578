//! Decision stage: picks the next operation (or the answer) for the executor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ChainError;
use crate::llm::LlmClient;
use crate::message::{Message, ToolCall};
use crate::prompt::{ChatPromptTemplate, PromptInput};
use crate::tools::ToolSpec;

use super::transcript::Transcript;

/// Placeholder name for the session history in a decision prompt.
pub const CHAT_HISTORY: &str = "chat_history";
/// Placeholder name for the transcript in a decision prompt.
pub const AGENT_SCRATCHPAD: &str = "agent_scratchpad";

/// What the decision stage sees each round.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub input: &'a Value,
    /// Session history from earlier successful invocations.
    pub history: &'a [Message],
    /// Everything dispatched and observed so far in this invocation.
    pub transcript: &'a Transcript,
    pub tools: &'a [ToolSpec],
    /// Zero-based round number.
    pub round: u32,
}

/// Outcome of one decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Requested operations; only the first is dispatched.
    Calls(Vec<ToolCall>),
    /// Direct terminal answer; no tool is dispatched.
    Answer(Value),
}

impl Decision {
    /// A single call of `name` with `arguments`.
    pub fn call(name: impl Into<String>, arguments: Value) -> Self {
        Self::Calls(vec![ToolCall::new(name, arguments)])
    }
}

/// Chooses the next step from the input, history and transcript.
#[async_trait]
pub trait DecisionStage: Send + Sync {
    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Decision, ChainError>;
}

#[async_trait]
impl<T> DecisionStage for Arc<T>
where
    T: DecisionStage + ?Sized,
{
    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Decision, ChainError> {
        (**self).decide(ctx).await
    }
}

type DecideFn = Arc<dyn Fn(&DecisionContext<'_>) -> Result<Decision, ChainError> + Send + Sync>;

/// Decision stage backed by a closure; used for scripted agents and tests.
///
/// ```
/// use braid::executor::{Decision, FnDecision};
///
/// // "double" first, then "finish" with whatever "double" returned.
/// let decide = FnDecision::new(|ctx| {
///     Ok(match ctx.transcript.last_observation() {
///         None => Decision::call("double", ctx.input.clone()),
///         Some(v) => Decision::call("finish", v.clone()),
///     })
/// });
/// ```
#[derive(Clone)]
pub struct FnDecision {
    func: DecideFn,
}

impl FnDecision {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&DecisionContext<'_>) -> Result<Decision, ChainError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl DecisionStage for FnDecision {
    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Decision, ChainError> {
        (self.func)(ctx)
    }
}

/// Decision stage that asks a chat model.
///
/// Each round renders the prompt with the input, the session history
/// (`chat_history`) and the transcript as scratchpad messages
/// (`agent_scratchpad`), then calls the model. Tool calls become
/// [`Decision::Calls`]; a plain text reply becomes [`Decision::Answer`]; a reply
/// with neither becomes an empty `Calls`, which the executor rejects.
pub struct LlmDecision {
    llm: Arc<dyn LlmClient>,
    prompt: ChatPromptTemplate,
}

impl LlmDecision {
    /// Standard agent prompt: system, history, `{input}`, scratchpad.
    pub fn new(llm: impl LlmClient + 'static, system_prompt: impl Into<String>) -> Self {
        Self::from_arc(Arc::new(llm), system_prompt)
    }

    pub fn from_arc(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        let prompt = ChatPromptTemplate::new()
            .system(system_prompt)
            .placeholder(CHAT_HISTORY)
            .human("{input}")
            .placeholder(AGENT_SCRATCHPAD);
        Self { llm, prompt }
    }

    /// Replace the prompt (builder). It may use `{input}`, `chat_history` and
    /// `agent_scratchpad`.
    pub fn with_prompt(mut self, prompt: ChatPromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    fn prompt_input(ctx: &DecisionContext<'_>) -> PromptInput {
        PromptInput::new()
            .var("input", ctx.input.clone())
            .messages(CHAT_HISTORY, ctx.history.to_vec())
            .messages(AGENT_SCRATCHPAD, ctx.transcript.to_messages())
    }
}

#[async_trait]
impl DecisionStage for LlmDecision {
    async fn decide(&self, ctx: &DecisionContext<'_>) -> Result<Decision, ChainError> {
        let messages = self.prompt.format_messages(&Self::prompt_input(ctx))?;
        let response = self.llm.invoke(&messages).await?;
        if !response.tool_calls.is_empty() {
            if response.tool_calls.len() > 1 {
                tracing::debug!(
                    requested = response.tool_calls.len(),
                    "Model requested several tools; only the first is dispatched"
                );
            }
            return Ok(Decision::Calls(response.tool_calls));
        }
        if !response.content.trim().is_empty() {
            return Ok(Decision::Answer(Value::String(response.content)));
        }
        Ok(Decision::Calls(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm::{LlmResponse, MockLlm};

    fn ctx<'a>(
        input: &'a Value,
        history: &'a [Message],
        transcript: &'a Transcript,
    ) -> DecisionContext<'a> {
        DecisionContext {
            input,
            history,
            transcript,
            tools: &[],
            round: 0,
        }
    }

    /// **Scenario**: the prompt holds system, history, input and scratchpad in order.
    #[tokio::test]
    async fn llm_decision_renders_history_and_scratchpad() {
        let llm = Arc::new(MockLlm::with_content("Hold."));
        let decision = LlmDecision::from_arc(llm.clone(), "You are an analyst.");
        let input = json!("Buy GOOGL?");
        let history = vec![Message::user("earlier"), Message::assistant("answer")];
        let mut transcript = Transcript::new();
        let call = ToolCall::new("get_stock_price", json!({"symbol": "GOOGL"})).with_id("c1");
        transcript.push_request(call);
        transcript.push_observation("c1", "get_stock_price", json!(140.2));

        let d = decision.decide(&ctx(&input, &history, &transcript)).await.unwrap();
        assert_eq!(d, Decision::Answer(json!("Hold.")));

        let seen = llm.seen_messages();
        let seen = &seen[0];
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], Message::system("You are an analyst."));
        assert_eq!(seen[1], Message::user("earlier"));
        assert_eq!(seen[3], Message::user("Buy GOOGL?"));
        assert_eq!(seen[5], Message::tool("c1", "140.2"));
    }

    /// **Scenario**: all tool calls are returned; the executor dispatches the first.
    #[tokio::test]
    async fn llm_decision_returns_tool_calls_in_order() {
        let llm = MockLlm::new(vec![LlmResponse::tool_calls(vec![
            ToolCall::new("get_stock_price", json!({"symbol": "TSLA"})),
            ToolCall::new("get_company_news_sentiment", json!({"symbol": "TSLA"})),
        ])]);
        let decision = LlmDecision::new(llm, "sys");
        let input = json!("TSLA?");
        let d = decision.decide(&ctx(&input, &[], &Transcript::new())).await.unwrap();
        match d {
            Decision::Calls(calls) => {
                assert_eq!(calls.len(), 2);
                assert_eq!(calls[0].name, "get_stock_price");
            }
            other => panic!("expected calls, got {:?}", other),
        }
    }

    /// **Scenario**: an empty reply is an empty decision.
    #[tokio::test]
    async fn llm_decision_empty_reply_is_empty_calls() {
        let decision = LlmDecision::new(MockLlm::with_content("  "), "sys");
        let input = json!("x");
        let d = decision.decide(&ctx(&input, &[], &Transcript::new())).await.unwrap();
        assert_eq!(d, Decision::Calls(vec![]));
    }

    /// **Scenario**: FnDecision sees the round and transcript.
    #[tokio::test]
    async fn fn_decision_reads_context() {
        let decide = FnDecision::new(|ctx| Ok(Decision::Answer(json!(ctx.round))));
        let input = json!(null);
        let transcript = Transcript::new();
        let mut c = ctx(&input, &[], &transcript);
        c.round = 2;
        assert_eq!(decide.decide(&c).await.unwrap(), Decision::Answer(json!(2)));
    }
}
