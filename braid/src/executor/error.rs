//! Executor error types.

use thiserror::Error;

use crate::error::ChainError;
use crate::tools::ToolError;

use super::transcript::Transcript;

/// Error ending an executor invocation.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The decision stage requested a tool that is not registered.
    /// `transcript` holds the entries recorded before the failed dispatch.
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String, transcript: Transcript },

    /// No terminal result within `max_iterations` rounds; the result is incomplete.
    #[error("iteration limit exceeded: no final answer after {max_iterations} rounds")]
    IterationLimitExceeded {
        max_iterations: u32,
        transcript: Transcript,
    },

    /// The decision stage returned neither a request nor an answer.
    #[error("decision stage returned no operation")]
    EmptyDecision,

    /// The decision stage itself failed.
    #[error("decision stage failed: {0}")]
    Decision(#[source] ChainError),

    /// A registered tool failed.
    #[error("tool '{name}' failed: {source}")]
    Tool {
        name: String,
        #[source]
        source: ToolError,
    },
}

impl ExecutorError {
    /// Transcript accumulated before the failure, when the error carries one.
    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            Self::UnknownOperation { transcript, .. }
            | Self::IterationLimitExceeded { transcript, .. } => Some(transcript),
            _ => None,
        }
    }

    /// True when the invocation ran out of rounds rather than failing.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IterationLimitExceeded { .. })
    }
}
