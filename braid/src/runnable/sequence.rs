//! Sequence: stage A then stage B.

use async_trait::async_trait;

use crate::error::ChainError;
use crate::logging::{log_stage_complete, log_stage_error, log_stage_start};

use super::{impl_pipe_operator, Runnable};

/// Composition of two stages: `invoke(x) = second.invoke(first.invoke(x))`.
///
/// The sequence owns both links; stages themselves never point at a successor.
/// A failure in `first` aborts the chain before `second` runs.
pub struct Sequence<A, B> {
    first: A,
    second: B,
    name: String,
}

impl<A, B> Sequence<A, B>
where
    A: Runnable,
    B: Runnable<Input = A::Output>,
{
    pub fn new(first: A, second: B) -> Self {
        let name = format!("{} | {}", first.name(), second.name());
        Self {
            first,
            second,
            name,
        }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

async fn run_stage<R: Runnable + ?Sized>(
    stage: &R,
    input: R::Input,
) -> Result<R::Output, ChainError> {
    log_stage_start(stage.name());
    match stage.invoke(input).await {
        Ok(out) => {
            log_stage_complete(stage.name());
            Ok(out)
        }
        Err(e) => {
            log_stage_error(stage.name(), &e);
            Err(e)
        }
    }
}

#[async_trait]
impl<A, B> Runnable for Sequence<A, B>
where
    A: Runnable,
    B: Runnable<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: Self::Input) -> Result<Self::Output, ChainError> {
        let intermediate = run_stage(&self.first, input).await?;
        run_stage(&self.second, intermediate).await
    }
}

impl_pipe_operator!(Sequence<A, B>, A, B);
