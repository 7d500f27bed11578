//! Runnable execution error types.
//!
//! Returned by `Runnable::invoke` and by every combinator built on it
//! (sequence, parallel, assign). Executor-level errors live in
//! [`crate::executor::ExecutorError`].

use thiserror::Error;

/// Error raised while invoking a stage or a composition of stages.
///
/// A failing stage aborts the enclosing chain; no partial result is produced.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A stage failed during `invoke` (e.g. model call failed, bad data).
    #[error("stage failed: {0}")]
    StageFailed(String),

    /// A parallel branch failed; the whole parallel invocation fails with it.
    #[error("branch '{branch}' failed: {source}")]
    BranchFailed {
        branch: String,
        #[source]
        source: Box<ChainError>,
    },

    /// Two branches share a name (builder), or assign targets an existing key.
    #[error("duplicate branch: {0}")]
    DuplicateBranch(String),

    /// Input does not have the shape the stage expects (e.g. missing template variable).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ChainError {
    /// Shorthand for [`ChainError::StageFailed`].
    pub fn stage(message: impl Into<String>) -> Self {
        Self::StageFailed(message.into())
    }

    /// Name of the failing branch when this is a [`ChainError::BranchFailed`].
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::BranchFailed { branch, .. } => Some(branch),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of StageFailed contains "stage failed" and the message.
    #[test]
    fn chain_error_display_stage_failed() {
        let err = ChainError::stage("boom");
        let s = err.to_string();
        assert!(s.contains("stage failed"), "{}", s);
        assert!(s.contains("boom"), "{}", s);
    }

    /// **Scenario**: BranchFailed names the branch and exposes the inner error as source.
    #[test]
    fn chain_error_branch_failed_has_branch_and_source() {
        let err = ChainError::BranchFailed {
            branch: "priority".into(),
            source: Box::new(ChainError::stage("inner")),
        };
        assert_eq!(err.branch(), Some("priority"));
        assert!(err.to_string().contains("priority"));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("inner"));
    }

    /// **Scenario**: Non-branch variants report no branch name.
    #[test]
    fn chain_error_branch_is_none_for_other_variants() {
        assert!(ChainError::DuplicateBranch("x".into()).branch().is_none());
        assert!(ChainError::InvalidInput("y".into()).branch().is_none());
    }
}
