//! Runnables: single-input/single-output async stages and the combinators that
//! compose them.
//!
//! A [`Runnable`] transforms `Input` into `Output`. Stages are composed with
//! [`RunnableExt::pipe`] or the `|` operator into a [`Sequence`], which is
//! itself a runnable, so chains nest without special-casing and
//! `(a | b) | c` behaves exactly like `a | (b | c)`. [`Parallel`] fans one input
//! out to named branches; [`Assign`] adds one more named branch to an
//! already-computed [`BranchMap`].
//!
//! Compositions are assembled once and never mutated; they can be shared
//! read-only (`Arc`) across concurrent invocations.

mod assign;
mod lambda;
mod parallel;
mod passthrough;
mod sequence;

pub use assign::Assign;
pub use lambda::Lambda;
pub use parallel::{BranchMap, Parallel, ParallelBuilder};
pub use passthrough::Passthrough;
pub use sequence::Sequence;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChainError;

/// One stage: input in, output out.
///
/// A stage may perform side effects (printing, network calls). Failure is
/// returned to the caller unmodified; no local recovery happens here.
#[async_trait]
pub trait Runnable: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Display name used in logs and in composed names (e.g. `"prompt | model"`).
    fn name(&self) -> &str {
        "runnable"
    }

    async fn invoke(&self, input: Self::Input) -> Result<Self::Output, ChainError>;
}

/// Boxed runnable with erased stage type.
pub type BoxRunnable<I, O> = Box<dyn Runnable<Input = I, Output = O>>;

/// Shared runnable with erased stage type; used for parallel branches.
pub type SharedRunnable<I, O> = Arc<dyn Runnable<Input = I, Output = O>>;

#[async_trait]
impl<R> Runnable for Arc<R>
where
    R: Runnable + ?Sized,
{
    type Input = R::Input;
    type Output = R::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn invoke(&self, input: Self::Input) -> Result<Self::Output, ChainError> {
        (**self).invoke(input).await
    }
}

#[async_trait]
impl<R> Runnable for Box<R>
where
    R: Runnable + ?Sized,
{
    type Input = R::Input;
    type Output = R::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn invoke(&self, input: Self::Input) -> Result<Self::Output, ChainError> {
        (**self).invoke(input).await
    }
}

/// Combinators available on every runnable.
pub trait RunnableExt: Runnable + Sized {
    /// `self` then `next`: the output of `self` is the input of `next`.
    fn pipe<R>(self, next: R) -> Sequence<Self, R>
    where
        R: Runnable<Input = Self::Output>,
    {
        Sequence::new(self, next)
    }

    /// Runs `self` (which yields a branch map), then `branch` over that map, and
    /// inserts the branch result under `key`.
    fn assign<R, O>(self, key: impl Into<String>, branch: R) -> Assign<Self, R>
    where
        Self: Runnable<Output = BranchMap<O>>,
        R: Runnable<Input = BranchMap<O>, Output = O>,
        O: Clone + Send + Sync + 'static,
    {
        Assign::new(self, key, branch)
    }

    fn boxed(self) -> BoxRunnable<Self::Input, Self::Output>
    where
        Self: 'static,
    {
        Box::new(self)
    }

    fn shared(self) -> SharedRunnable<Self::Input, Self::Output>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<T: Runnable> RunnableExt for T {}

/// Implements `|` for a concrete runnable type: `a | b` is `a.pipe(b)`.
macro_rules! impl_pipe_operator {
    ($ty:ty $(, $g:ident)*) => {
        impl<$($g,)* Rhs> std::ops::BitOr<Rhs> for $ty
        where
            $ty: $crate::runnable::Runnable,
            Rhs: $crate::runnable::Runnable<
                Input = <$ty as $crate::runnable::Runnable>::Output,
            >,
        {
            type Output = $crate::runnable::Sequence<$ty, Rhs>;

            fn bitor(self, rhs: Rhs) -> Self::Output {
                $crate::runnable::Sequence::new(self, rhs)
            }
        }
    };
}

pub(crate) use impl_pipe_operator;

#[cfg(test)]
mod tests {
    use super::*;

    struct AddOne;

    #[async_trait]
    impl Runnable for AddOne {
        type Input = i64;
        type Output = i64;

        fn name(&self) -> &str {
            "add_one"
        }

        async fn invoke(&self, input: i64) -> Result<i64, ChainError> {
            Ok(input + 1)
        }
    }

    struct Unnamed;

    #[async_trait]
    impl Runnable for Unnamed {
        type Input = ();
        type Output = ();

        async fn invoke(&self, _input: ()) -> Result<(), ChainError> {
            Ok(())
        }
    }

    /// **Scenario**: Arc and Box wrappers delegate name and invoke.
    #[tokio::test]
    async fn arc_and_box_delegate() {
        let shared = AddOne.shared();
        assert_eq!(shared.name(), "add_one");
        assert_eq!(shared.invoke(1).await.unwrap(), 2);
        let boxed = AddOne.boxed();
        assert_eq!(boxed.invoke(41).await.unwrap(), 42);
    }

    /// **Scenario**: default name is "runnable".
    #[test]
    fn default_name() {
        assert_eq!(Unnamed.name(), "runnable");
    }

    /// **Scenario**: pipe on a user-defined runnable builds a sequence.
    #[tokio::test]
    async fn pipe_user_defined() {
        let chain = AddOne.pipe(AddOne).pipe(AddOne);
        assert_eq!(chain.invoke(0).await.unwrap(), 3);
        assert_eq!(chain.name(), "add_one | add_one | add_one");
    }
}
