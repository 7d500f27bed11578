//! Bounded tool-calling loop.
//!
//! Each round the [`DecisionStage`] looks at the input, the session history and
//! the transcript so far, and either answers directly or requests tools. The
//! first requested tool is resolved in the [`ToolRegistry`], recorded as a
//! request, called, and its result recorded as an observation with the same
//! call id. The loop ends when the terminal tool (default `final_answer`) has
//! run, when the decision stage answers directly, or after `max_iterations`
//! rounds with [`ExecutorError::IterationLimitExceeded`].
//!
//! On success the input and the final value are appended to the history as a
//! user / assistant pair.

mod decision;
mod error;
mod history;
mod transcript;

pub use decision::{
    Decision, DecisionContext, DecisionStage, FnDecision, LlmDecision, AGENT_SCRATCHPAD,
    CHAT_HISTORY,
};
pub use error::ExecutorError;
pub use history::SessionHistories;
pub use transcript::{Transcript, TranscriptEntry};

use std::sync::Arc;

use serde_json::Value;

use crate::logging::{
    log_executor_complete, log_executor_start, log_iteration_limit, log_round,
    log_unknown_operation,
};
use crate::message::{value_to_text, Message};
use crate::tools::ToolRegistry;

/// Default round limit.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;
/// Default terminal tool name.
pub const DEFAULT_TERMINAL_TOOL: &str = "final_answer";

/// Loop limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Maximum rounds (dispatches) per invocation.
    pub max_iterations: u32,
    /// Tool whose result ends the loop.
    pub terminal_tool: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            terminal_tool: DEFAULT_TERMINAL_TOOL.to_string(),
        }
    }
}

/// Successful result of [`AgentExecutor::run`].
#[derive(Debug, Clone)]
pub struct ExecutorOutcome {
    /// Terminal tool result, or the decision stage's direct answer.
    pub output: Value,
    pub transcript: Transcript,
    /// Rounds taken, including the terminal one.
    pub rounds: u32,
    /// History passed in, plus the input and the output of this invocation.
    pub history: Vec<Message>,
}

/// The agent executor: decision stage + tool registry + limits.
///
/// Immutable once built; share it across tasks behind an `Arc`. Session
/// histories for [`AgentExecutor::invoke`] live in a concurrent map.
pub struct AgentExecutor {
    decision: Arc<dyn DecisionStage>,
    tools: ToolRegistry,
    config: ExecutorConfig,
    histories: SessionHistories,
}

impl AgentExecutor {
    pub fn new(decision: impl DecisionStage + 'static, tools: ToolRegistry) -> Self {
        Self::from_arc(Arc::new(decision), tools)
    }

    pub fn from_arc(decision: Arc<dyn DecisionStage>, tools: ToolRegistry) -> Self {
        Self {
            decision,
            tools,
            config: ExecutorConfig::default(),
            histories: SessionHistories::new(),
        }
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn with_terminal_tool(mut self, name: impl Into<String>) -> Self {
        self.config.terminal_tool = name.into();
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn histories(&self) -> &SessionHistories {
        &self.histories
    }

    /// Runs the loop with an explicit history. No executor state is touched.
    pub async fn run(
        &self,
        input: impl Into<Value>,
        history: Vec<Message>,
    ) -> Result<ExecutorOutcome, ExecutorError> {
        let input = input.into();
        let input_text = value_to_text(&input);
        let specs = self.tools.list();
        let max_iterations = self.config.max_iterations;
        let mut transcript = Transcript::new();

        log_executor_start(&input_text, max_iterations);

        for round in 0..max_iterations {
            let ctx = DecisionContext {
                input: &input,
                history: &history,
                transcript: &transcript,
                tools: &specs,
                round,
            };
            let decision = self
                .decision
                .decide(&ctx)
                .await
                .map_err(ExecutorError::Decision)?;

            let mut call = match decision {
                Decision::Answer(output) => {
                    return Ok(finish(input_text, output, transcript, round + 1, history));
                }
                Decision::Calls(calls) => calls
                    .into_iter()
                    .next()
                    .ok_or(ExecutorError::EmptyDecision)?,
            };

            let Some(tool) = self.tools.get(&call.name) else {
                log_unknown_operation(&call.name);
                return Err(ExecutorError::UnknownOperation {
                    name: call.name,
                    transcript,
                });
            };

            let call_id = call
                .id
                .get_or_insert_with(|| format!("call_{}", round))
                .clone();
            let name = call.name.clone();
            let arguments = call.arguments.clone();
            transcript.push_request(call);
            log_round(round, &name, &call_id);

            let result = tool
                .call(arguments)
                .await
                .map_err(|source| ExecutorError::Tool {
                    name: name.clone(),
                    source,
                })?;
            transcript.push_observation(call_id, name.as_str(), result.clone());

            if name == self.config.terminal_tool {
                return Ok(finish(input_text, result, transcript, round + 1, history));
            }
        }

        log_iteration_limit(max_iterations);
        Err(ExecutorError::IterationLimitExceeded {
            max_iterations,
            transcript,
        })
    }

    /// Runs the loop for `session_id`, reading and extending that session's history.
    pub async fn invoke(
        &self,
        session_id: &str,
        input: impl Into<Value>,
    ) -> Result<Value, ExecutorError> {
        let history = self.histories.get(session_id);
        let before = history.len();
        let outcome = self.run(input, history).await?;
        self.histories
            .append(session_id, outcome.history.into_iter().skip(before));
        Ok(outcome.output)
    }
}

fn finish(
    input_text: String,
    output: Value,
    transcript: Transcript,
    rounds: u32,
    mut history: Vec<Message>,
) -> ExecutorOutcome {
    log_executor_complete(rounds);
    history.push(Message::User(input_text));
    history.push(Message::Assistant(value_to_text(&output)));
    ExecutorOutcome {
        output,
        transcript,
        rounds,
        history,
    }
}
