// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::deferred::Deferred;

/// Run `continuation` once `input` succeeds and report its result into `output`.
///
/// On success the continuation receives the input value and returns the next
/// deferred result, whose eventual outcome is forwarded into `output` unchanged.
/// On failure the cause goes straight to `output` and the continuation is
/// never invoked.
///
/// This takes the handler slot of `input`.
///
/// # Example
/// ```
/// use quote_desk::engine::{compose, Deferred};
///
/// let connected = Deferred::<u32>::new();
/// let dropped = Deferred::<&str>::new();
/// compose(&connected, |_connection| Deferred::succeeded("dropped"), dropped.clone());
///
/// connected.complete(1);
/// assert_eq!(dropped.outcome(), Some(Ok("dropped")));
/// ```
pub fn compose<A, B, F>(input: &Deferred<A>, continuation: F, output: Deferred<B>)
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    F: FnOnce(A) -> Deferred<B> + Send + 'static,
{
    input.on_outcome(move |outcome| match outcome {
        Ok(value) => {
            let next = continuation(value);
            next.on_outcome(move |next_outcome| output.settle(next_outcome));
        }
        Err(cause) => output.fail(cause),
    });
}

impl<A> Deferred<A>
where
    A: Clone + Send + 'static,
{
    /// [`compose`] into a freshly allocated output.
    pub fn and_then<B, F>(&self, continuation: F) -> Deferred<B>
    where
        B: Clone + Send + 'static,
        F: FnOnce(A) -> Deferred<B> + Send + 'static,
    {
        let output = Deferred::new();
        compose(self, continuation, output.clone());
        output
    }

    /// Transform the success value without starting another operation.
    pub fn map<B, F>(&self, transform: F) -> Deferred<B>
    where
        B: Clone + Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.and_then(move |value| Deferred::succeeded(transform(value)))
    }
}
