//! Parallel: fan one input out to named branches and collect a map of results.
//!
//! Branches are independent (none observes another's output), so they are
//! polled concurrently on the calling task. The result is returned only after
//! every branch has finished or failed.
//!
//! # Failure policy
//!
//! - [`Parallel::invoke`] is fail-fast: if any branch fails, the invocation fails
//!   with [`ChainError::BranchFailed`] naming the first failing branch in
//!   declaration order.
//! - [`Parallel::invoke_settled`] keeps every branch's own `Result`.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::ChainError;
use crate::logging::log_branch_failed;

use super::{impl_pipe_operator, Runnable, SharedRunnable};

/// Mapping branch name → branch output. Keys are unique.
pub type BranchMap<O> = BTreeMap<String, O>;

/// Named branches sharing one input.
///
/// Built with [`Parallel::builder`]; immutable afterwards.
pub struct Parallel<I, O> {
    branches: Vec<(String, SharedRunnable<I, O>)>,
    name: String,
}

/// Builder for [`Parallel`]; duplicate names are reported by `build`.
pub struct ParallelBuilder<I, O> {
    branches: Vec<(String, SharedRunnable<I, O>)>,
}

impl<I, O> ParallelBuilder<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    /// Adds a named branch.
    pub fn branch<R>(mut self, name: impl Into<String>, runnable: R) -> Self
    where
        R: Runnable<Input = I, Output = O> + 'static,
    {
        self.branches.push((name.into(), Arc::new(runnable)));
        self
    }

    /// Returns `DuplicateBranch` when two branches share a name.
    pub fn build(self) -> Result<Parallel<I, O>, ChainError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.branches {
            if !seen.insert(name.as_str()) {
                return Err(ChainError::DuplicateBranch(name.clone()));
            }
        }
        let name = format!(
            "parallel<{}>",
            self.branches
                .iter()
                .map(|(n, _)| n.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Parallel {
            branches: self.branches,
            name,
        })
    }
}

impl<I, O> Parallel<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    pub fn builder() -> ParallelBuilder<I, O> {
        ParallelBuilder {
            branches: Vec::new(),
        }
    }

    /// Branch names in declaration order.
    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    async fn run_all(&self, input: I) -> Vec<(&str, Result<O, ChainError>)> {
        let runs = self.branches.iter().map(|(name, runnable)| {
            let input = input.clone();
            async move { (name.as_str(), runnable.invoke(input).await) }
        });
        join_all(runs).await
    }

    /// Runs every branch and keeps each branch's own result.
    pub async fn invoke_settled(&self, input: I) -> BranchMap<Result<O, ChainError>> {
        self.run_all(input)
            .await
            .into_iter()
            .map(|(name, result)| (name.to_string(), result))
            .collect()
    }
}

#[async_trait]
impl<I, O> Runnable for Parallel<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = BranchMap<O>;

    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: I) -> Result<BranchMap<O>, ChainError> {
        let mut out = BranchMap::new();
        for (name, result) in self.run_all(input).await {
            match result {
                Ok(value) => {
                    out.insert(name.to_string(), value);
                }
                Err(e) => {
                    log_branch_failed(name, &e);
                    return Err(ChainError::BranchFailed {
                        branch: name.to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(out)
    }
}

impl_pipe_operator!(Parallel<I, O>, I, O);
