//! Passthrough: returns its input unchanged.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::ChainError;

use super::{impl_pipe_operator, Runnable};

/// Identity stage. Useful as a parallel branch that keeps the original input.
pub struct Passthrough<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Passthrough<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Passthrough<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Runnable for Passthrough<T>
where
    T: Send + 'static,
{
    type Input = T;
    type Output = T;

    fn name(&self) -> &str {
        "passthrough"
    }

    async fn invoke(&self, input: T) -> Result<T, ChainError> {
        Ok(input)
    }
}

impl_pipe_operator!(Passthrough<T>, T);
