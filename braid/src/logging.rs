//! Logging helpers for runnable and executor events.
//!
//! Structured `tracing` events for stage execution, parallel branches and
//! executor rounds, so every call site logs with the same fields.

use crate::error::ChainError;

/// Log stage execution start.
pub fn log_stage_start(stage: &str) {
    tracing::debug!(stage = stage, "Starting stage");
}

/// Log stage execution completion.
pub fn log_stage_complete(stage: &str) {
    tracing::debug!(stage = stage, "Stage complete");
}

/// Log stage failure; the error propagates to the caller unchanged.
pub fn log_stage_error(stage: &str, error: &ChainError) {
    tracing::debug!(stage = stage, %error, "Stage failed");
}

/// Log a failed parallel branch.
pub fn log_branch_failed(branch: &str, error: &ChainError) {
    tracing::warn!(branch = branch, %error, "Parallel branch failed");
}

/// Log executor invocation start.
pub fn log_executor_start(input: &str, max_iterations: u32) {
    tracing::info!(input = input, max_iterations, "Starting executor");
}

/// Log one dispatch round.
pub fn log_round(round: u32, tool: &str, call_id: &str) {
    tracing::info!(round, tool = tool, call_id = call_id, "Dispatching tool");
}

/// Log executor completion with a terminal result.
pub fn log_executor_complete(rounds: u32) {
    tracing::info!(rounds, "Executor complete");
}

/// Log executor hitting its iteration limit.
pub fn log_iteration_limit(max_iterations: u32) {
    tracing::warn!(max_iterations, "Executor reached iteration limit without a final answer");
}

/// Log a request for a tool that is not registered.
pub fn log_unknown_operation(name: &str) {
    tracing::error!(tool = name, "Decision requested an unknown tool");
}
