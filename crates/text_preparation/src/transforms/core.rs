use anyhow::{Context, Result};
use std::marker::PhantomData;

/// A stateless, thread-safe operation converting an input of type `I` into
/// an output of type `O`.
///
/// Pipeline stages are composed with [`then`](Transform::then), which inlines
/// both steps into a single [`Chain`], with no boxing and no dynamic dispatch.
/// `then()` requires the output type of the first stage to match the input
/// type of the second, checked at compile time.
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input.
    fn apply(&self, input: I) -> Result<O>;

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }
}

/// Two transforms run back to back (`A` then `B`).
/// `PhantomData<M>` pins the intermediate type so inference stays anchored.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Builds a chain directly; [`Transform::then`] is the ergonomic spelling.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        self.first
            .apply(input)
            .and_then(|mid| self.second.apply(mid))
            .with_context(|| {
                format!(
                    "Transform chain failed: {} → {}",
                    std::any::type_name::<A>(),
                    std::any::type_name::<B>(),
                )
            })
    }
}
