//! Lambda: a runnable backed by a plain closure.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChainError;

use super::{impl_pipe_operator, Runnable};

type LambdaFn<I, O> = Arc<dyn Fn(I) -> Result<O, ChainError> + Send + Sync>;

/// Wraps a synchronous function `I -> Result<O, ChainError>` as a stage.
///
/// Use [`Lambda::map`] for infallible transforms.
pub struct Lambda<I, O> {
    name: String,
    func: LambdaFn<I, O>,
}

impl<I, O> Lambda<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(I) -> Result<O, ChainError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn map<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::new(name, move |input| Ok(func(input)))
    }
}

impl<I, O> Clone for Lambda<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

#[async_trait]
impl<I, O> Runnable for Lambda<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: I) -> Result<O, ChainError> {
        (self.func)(input)
    }
}

impl_pipe_operator!(Lambda<I, O>, I, O);
