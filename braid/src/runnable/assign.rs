//! Assign: extend a branch map with one more named branch.

use async_trait::async_trait;

use crate::error::ChainError;
use crate::logging::{log_stage_complete, log_stage_start};

use super::{impl_pipe_operator, BranchMap, Runnable};

/// Runs `inner` to get a [`BranchMap`], then runs `branch` with that map as its
/// input and inserts the result under `key`.
///
/// Map-union, not map-replace: entries computed by `inner` are kept as they
/// are, and a `key` that `inner` already produced fails the invocation with
/// [`ChainError::DuplicateBranch`].
pub struct Assign<P, R> {
    inner: P,
    key: String,
    branch: R,
    name: String,
}

impl<P, R> Assign<P, R>
where
    P: Runnable,
    R: Runnable,
{
    pub fn new(inner: P, key: impl Into<String>, branch: R) -> Self {
        let key = key.into();
        let name = format!("{}.assign({}={})", inner.name(), key, branch.name());
        Self {
            inner,
            key,
            branch,
            name,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl<P, R, O> Runnable for Assign<P, R>
where
    P: Runnable<Output = BranchMap<O>>,
    R: Runnable<Input = BranchMap<O>, Output = O>,
    O: Clone + Send + Sync + 'static,
{
    type Input = P::Input;
    type Output = BranchMap<O>;

    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: P::Input) -> Result<BranchMap<O>, ChainError> {
        let mut accumulated = self.inner.invoke(input).await?;
        if accumulated.contains_key(&self.key) {
            return Err(ChainError::DuplicateBranch(self.key.clone()));
        }
        log_stage_start(&self.key);
        let value = self.branch.invoke(accumulated.clone()).await?;
        log_stage_complete(&self.key);
        accumulated.insert(self.key.clone(), value);
        Ok(accumulated)
    }
}

impl_pipe_operator!(Assign<P, R>, P, R);

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::runnable::{Lambda, Parallel, RunnableExt};

    fn base() -> Parallel<Value, Value> {
        Parallel::builder()
            .branch("raw_copy", Lambda::map("raw_copy", |x: Value| x["content"].clone()))
            .branch("author", Lambda::map("author", |x: Value| x["author"].clone()))
            .build()
            .unwrap()
    }

    /// **Scenario**: assign adds one key and leaves earlier branches unchanged.
    #[tokio::test]
    async fn assign_is_map_union() {
        let before = base()
            .invoke(json!({"content": "hot", "author": "Admin"}))
            .await
            .unwrap();

        let chain = base().assign(
            "shout",
            Lambda::map("shout", |m: BranchMap<Value>| {
                json!(m["raw_copy"].as_str().unwrap_or_default().to_uppercase())
            }),
        );
        let after = chain
            .invoke(json!({"content": "hot", "author": "Admin"}))
            .await
            .unwrap();

        assert_eq!(after.len(), before.len() + 1);
        for (k, v) in &before {
            assert_eq!(&after[k], v);
        }
        assert_eq!(after["shout"], json!("HOT"));
    }

    /// **Scenario**: assigning an existing key fails instead of overwriting it.
    #[tokio::test]
    async fn assign_existing_key_is_rejected() {
        let chain =
            base().assign("author", Lambda::map("author2", |_: BranchMap<Value>| json!("x")));
        let err = chain
            .invoke(json!({"content": "c", "author": "Admin"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::DuplicateBranch(ref k) if k == "author"));
    }

    /// **Scenario**: a failing assign branch aborts with its own error.
    #[tokio::test]
    async fn assign_branch_failure_propagates() {
        let chain = base().assign(
            "boom",
            Lambda::new("boom", |_: BranchMap<Value>| -> Result<Value, ChainError> {
                Err(ChainError::stage("assign failed"))
            }),
        );
        let err = chain.invoke(json!({})).await.unwrap_err();
        assert!(matches!(err, ChainError::StageFailed(_)));
    }
}
