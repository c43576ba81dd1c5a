// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::errors::{DeferredError, OperationError};

/// Final result of one asynchronous operation: the value, or the cause of failure.
pub type Outcome<T> = Result<T, OperationError>;

type Handler<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

struct Inner<T> {
    outcome: Option<Outcome<T>>,
    handler: Option<Handler<T>>,
    handler_attached: bool,
}

/// Single-assignment cell holding the eventual outcome of one asynchronous operation.
///
/// A `Deferred` starts pending and transitions at most once, to either a success
/// value or a failure cause. Exactly one completion handler may be attached; it
/// runs synchronously on whichever thread performs the transition, or right away
/// if the cell is already settled when the handler is attached.
///
/// Handles are cheap to clone and all clones observe the same cell. The
/// operation that produces the value keeps one clone to settle it, the consumer
/// attaches the handler through another, and anyone else may keep a clone to
/// inspect [`Deferred::outcome`] after the fact.
///
/// # Example
/// ```
/// use quote_desk::engine::Deferred;
///
/// let connection = Deferred::<u32>::new();
/// connection.on_outcome(|outcome| assert_eq!(outcome, Ok(7)));
/// connection.complete(7);
/// assert!(connection.is_settled());
/// ```
pub struct Deferred<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Deferred<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deferred<T>
where
    T: Clone + Send + 'static,
{
    /// Create a pending result.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                outcome: None,
                handler: None,
                handler_attached: false,
            })),
        }
    }

    /// Create a result that has already succeeded with `value`.
    pub fn succeeded(value: T) -> Self {
        let deferred = Self::new();
        deferred.complete(value);
        deferred
    }

    /// Create a result that has already failed with `cause`.
    pub fn failed(cause: OperationError) -> Self {
        let deferred = Self::new();
        deferred.fail(cause);
        deferred
    }

    /// Run `future` on the current tokio runtime and settle with its output.
    ///
    /// This is the adapter that turns any native async operation into a leaf
    /// deferred result. Must be called from within a runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        let deferred = Self::new();
        let settle = deferred.clone();
        tokio::spawn(async move {
            let outcome = future.await;
            settle.settle(outcome);
        });
        deferred
    }

    /// Run blocking `work` on the runtime's bounded blocking pool.
    ///
    /// The outcome is marshalled back and the result settled from a regular
    /// runtime task, so the completion handler never runs on a pool thread.
    pub fn spawn_blocking<F>(work: F) -> Self
    where
        F: FnOnce() -> Outcome<T> + Send + 'static,
    {
        let deferred = Self::new();
        let settle = deferred.clone();
        let worker = tokio::task::spawn_blocking(work);
        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(err) => Err(OperationError::WorkerLost {
                    reason: err.to_string(),
                }),
            };
            settle.settle(outcome);
        });
        deferred
    }

    /// Transition to `succeeded(value)`.
    ///
    /// # Panics
    /// If the result is already settled.
    pub fn complete(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Transition to `failed(cause)`.
    ///
    /// # Panics
    /// If the result is already settled.
    pub fn fail(&self, cause: OperationError) {
        self.settle(Err(cause));
    }

    /// Transition to the given outcome.
    ///
    /// # Panics
    /// If the result is already settled. Settling twice means two producers
    /// believe they own the same operation.
    pub fn settle(&self, outcome: Outcome<T>) {
        if let Err(err) = self.try_settle(outcome) {
            panic!("cannot settle deferred result: {err}");
        }
    }

    pub fn try_complete(&self, value: T) -> Result<(), DeferredError> {
        self.try_settle(Ok(value))
    }

    pub fn try_fail(&self, cause: OperationError) -> Result<(), DeferredError> {
        self.try_settle(Err(cause))
    }

    /// Transition to the given outcome, reporting misuse instead of panicking.
    ///
    /// On success the attached handler, if any, has already run when this returns.
    pub fn try_settle(&self, outcome: Outcome<T>) -> Result<(), DeferredError> {
        let mut inner = self.lock();
        if inner.outcome.is_some() {
            return Err(DeferredError::AlreadySettled);
        }

        match inner.handler.take() {
            Some(handler) => {
                inner.outcome = Some(outcome.clone());
                // The handler may touch this cell again (e.g. `outcome()`).
                drop(inner);
                handler(outcome);
            }
            None => inner.outcome = Some(outcome),
        }
        Ok(())
    }

    /// Register the single completion handler.
    ///
    /// # Panics
    /// If a handler is already attached.
    pub fn on_outcome<F>(&self, handler: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        if let Err(err) = self.try_on_outcome(handler) {
            panic!("cannot attach completion handler: {err}");
        }
    }

    /// Register the single completion handler, reporting misuse instead of panicking.
    ///
    /// If the result is still pending the handler fires at the transition;
    /// otherwise it fires before this call returns, with the stored outcome.
    pub fn try_on_outcome<F>(&self, handler: F) -> Result<(), DeferredError>
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.handler_attached {
            return Err(DeferredError::HandlerAlreadyAttached);
        }
        inner.handler_attached = true;

        match &inner.outcome {
            Some(outcome) => {
                let outcome = outcome.clone();
                drop(inner);
                handler(outcome);
            }
            None => inner.handler = Some(Box::new(handler)),
        }
        Ok(())
    }

    /// Whether the result has left the pending state.
    pub fn is_settled(&self) -> bool {
        self.lock().outcome.is_some()
    }

    /// The stored outcome, once settled.
    pub fn outcome(&self) -> Option<Outcome<T>> {
        self.lock().outcome.clone()
    }

    /// Wait for the outcome from async code.
    ///
    /// This takes the single handler slot. If every producer is dropped before
    /// settling, the wait ends with [`OperationError::WorkerLost`].
    pub async fn wait(self) -> Outcome<T> {
        let (sender, receiver) = oneshot::channel();
        self.on_outcome(move |outcome| {
            // The waiter may have been dropped; nothing to deliver then.
            let _ = sender.send(outcome);
        });
        drop(self);

        receiver.await.unwrap_or_else(|_| {
            Err(OperationError::WorkerLost {
                reason: "deferred result dropped before settling".to_string(),
            })
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Deferred<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Deferred")
            .field("outcome", &inner.outcome)
            .field("handler_attached", &inner.handler_attached)
            .finish()
    }
}
