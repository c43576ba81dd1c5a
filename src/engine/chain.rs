// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::deferred::Deferred;

/// One step of a sequential chain: consumes the current value and starts the
/// operation producing the next one.
pub type ChainStep<I, O> = Box<dyn FnOnce(I) -> Deferred<O> + Send>;

/// Sequential chain threading one evolving value through ordered steps.
///
/// Each step runs only after the previous deferred result succeeded, with its
/// value. The first failure (the seed included) short-circuits: every later
/// step is skipped and the chain's output fails with that same cause.
///
/// Intermediate results are internal to the chain. A caller that needs to
/// inspect a pre-chain resource keeps its own clone of the seed.
///
/// # Example
/// ```
/// use quote_desk::engine::{Chain, Deferred};
///
/// let seed = Deferred::<u32>::new();
/// let result = Chain::new(seed.clone())
///     .then(|n| Deferred::succeeded(n + 1))
///     .then_if(false, |n| Deferred::succeeded(n * 100))
///     .then(|n| Deferred::succeeded(n.to_string()))
///     .into_deferred();
///
/// seed.complete(1);
/// assert_eq!(result.outcome(), Some(Ok("2".to_string())));
/// ```
pub struct Chain<T> {
    current: Deferred<T>,
}

impl<T> Chain<T>
where
    T: Clone + Send + 'static,
{
    /// Start a chain from the seed result.
    pub fn new(seed: Deferred<T>) -> Self {
        Self { current: seed }
    }

    /// Append a step.
    pub fn then<U, F>(self, step: F) -> Chain<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Deferred<U> + Send + 'static,
    {
        Chain {
            current: self.current.and_then(step),
        }
    }

    /// Append a step only when `condition` holds; otherwise the value passes through.
    pub fn then_if<F>(self, condition: bool, step: F) -> Chain<T>
    where
        F: FnOnce(T) -> Deferred<T> + Send + 'static,
    {
        if condition {
            self.then(step)
        } else {
            self
        }
    }

    /// The result of the last step.
    pub fn into_deferred(self) -> Deferred<T> {
        self.current
    }
}

/// Run a declared list of same-typed steps after `seed`.
pub fn chain<T>(seed: &Deferred<T>, steps: Vec<ChainStep<T, T>>) -> Deferred<T>
where
    T: Clone + Send + 'static,
{
    steps
        .into_iter()
        .fold(Chain::new(seed.clone()), |chain, step| chain.then(step))
        .into_deferred()
}

/// Release a resource once `result` settles, then forward its outcome.
///
/// `resource` is the deferred result that acquired the resource ahead of the
/// chain producing `result`. When `result` becomes terminal, success or
/// failure, `release` runs exactly once if and only if the resource was
/// actually acquired. The returned result settles after the release with the
/// outcome of `result`.
///
/// This takes the handler slot of `result` but only inspects `resource`.
pub fn release_after<T, R, F>(result: &Deferred<T>, resource: &Deferred<R>, release: F) -> Deferred<T>
where
    T: Clone + Send + 'static,
    R: Clone + Send + 'static,
    F: FnOnce(R) + Send + 'static,
{
    let output = Deferred::new();
    let forward = output.clone();
    let resource = resource.clone();

    result.on_outcome(move |outcome| {
        if let Some(Ok(acquired)) = resource.outcome() {
            release(acquired);
        }
        forward.settle(outcome);
    });

    output
}
