//! # Braid
//!
//! Composable async pipelines and a bounded tool-calling agent loop.
//!
//! ## Design principles
//!
//! - **One trait for every stage**: a [`Runnable`] turns one input into one output.
//!   Prompts, models, parsers, closures and whole chains are all runnables.
//! - **Composition is a value**: `a | b` builds a [`Sequence`], which is itself a
//!   runnable, so chains nest freely and `(a | b) | c` behaves like `a | (b | c)`.
//! - **Build once, share everywhere**: compositions are immutable after
//!   construction and can be invoked concurrently from many tasks.
//! - **Bounded agents**: the [`AgentExecutor`] dispatches exactly one tool per
//!   round and stops after `max_iterations` rounds.
//!
//! ## Main modules
//!
//! - [`runnable`]: [`Runnable`], [`Sequence`], [`Parallel`], [`Assign`], [`Lambda`], [`Passthrough`].
//! - [`prompt`]: [`PromptTemplate`], [`ChatPromptTemplate`].
//! - [`llm`]: [`LlmClient`], [`ChatModel`], [`StrOutputParser`], [`MockLlm`], [`ChatCompletionsClient`].
//! - [`tools`]: [`Tool`], [`ToolRegistry`], [`FnTool`] and the bundled demo tools.
//! - [`executor`]: [`AgentExecutor`], [`DecisionStage`], [`Transcript`], [`SessionHistories`].
//!
//! ## Example
//!
//! ```
//! use braid::{Lambda, Runnable};
//!
//! # async fn demo() -> Result<(), braid::ChainError> {
//! let chain = Lambda::map("who", |name: String| format!("Who is {}", name))
//!     | Lambda::map("answer", |_q: String| "AI Response: He is a cricketer".to_string())
//!     | Lambda::map("strip", |s: String| s.trim_start_matches("AI Response: ").to_string());
//! assert_eq!(chain.invoke("Virat".into()).await?, "He is a cricketer");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod llm;
pub mod logging;
pub mod message;
pub mod prompt;
pub mod runnable;
pub mod tools;

pub use error::ChainError;
pub use executor::{
    AgentExecutor, Decision, DecisionContext, DecisionStage, ExecutorConfig, ExecutorError,
    ExecutorOutcome, FnDecision, LlmDecision, SessionHistories, Transcript, TranscriptEntry,
};
pub use llm::{
    ChatCompletionsClient, ChatModel, LlmClient, LlmResponse, LlmUsage, MockLlm,
    StrOutputParser, ToolChoiceMode,
};
pub use message::{Message, ToolCall};
pub use prompt::{ChatPromptTemplate, PromptInput, PromptTemplate};
pub use runnable::{
    Assign, BoxRunnable, BranchMap, Lambda, Parallel, ParallelBuilder, Passthrough, Runnable,
    RunnableExt, Sequence, SharedRunnable,
};
pub use tools::{FnTool, Tool, ToolError, ToolRegistry, ToolSpec};
