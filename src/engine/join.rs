// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::deferred::{Deferred, Outcome};

/// Bookkeeping shared by the handlers of one join.
///
/// `slots` holds the values received so far; `completed` counts every settled
/// child, successes and failures alike; `failure` is single-assignment, first
/// writer wins.
struct JoinState<S> {
    slots: S,
    expected: usize,
    completed: usize,
    failure: bool,
}

type SharedJoin<S> = Arc<Mutex<JoinState<S>>>;

/// Record one child's outcome and settle `output` if this observation decides it.
///
/// `store` files a success value into its slot. `assemble` builds the joined
/// value once every child has succeeded.
fn observe<S, V, O>(
    state: &SharedJoin<S>,
    output: &Deferred<O>,
    outcome: Outcome<V>,
    store: impl FnOnce(&mut S, V),
    assemble: impl FnOnce(&mut S) -> Option<O>,
) where
    O: Clone + Send + 'static,
{
    let mut join = state.lock().unwrap_or_else(PoisonError::into_inner);
    join.completed += 1;

    match outcome {
        Ok(value) => {
            store(&mut join.slots, value);
            if join.completed < join.expected || join.failure {
                return;
            }
            // Every child succeeded exactly once, so every slot is filled.
            let Some(joined) = assemble(&mut join.slots) else {
                return;
            };
            drop(join);
            output.complete(joined);
        }
        Err(cause) => {
            if join.failure {
                // The output already failed with an earlier cause.
                return;
            }
            join.failure = true;
            drop(join);
            output.fail(cause);
        }
    }
}

fn shared<S>(slots: S, expected: usize) -> SharedJoin<S> {
    Arc::new(Mutex::new(JoinState {
        slots,
        expected,
        completed: 0,
        failure: false,
    }))
}

/// Join two heterogeneous results.
///
/// Succeeds with both values once both succeed; fails with the first observed
/// cause as soon as either fails. Siblings still in flight are not cancelled,
/// their later outcomes are simply ignored.
pub fn join2<A, B>(a: &Deferred<A>, b: &Deferred<B>) -> Deferred<(A, B)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    type Slots<A, B> = (Option<A>, Option<B>);
    fn assemble<A, B>(slots: &mut Slots<A, B>) -> Option<(A, B)> {
        Some((slots.0.take()?, slots.1.take()?))
    }

    let output = Deferred::new();
    let state: SharedJoin<Slots<A, B>> = shared((None, None), 2);

    let (join, out) = (Arc::clone(&state), output.clone());
    a.on_outcome(move |outcome| {
        observe(&join, &out, outcome, |slots, value| slots.0 = Some(value), assemble)
    });
    let (join, out) = (state, output.clone());
    b.on_outcome(move |outcome| {
        observe(&join, &out, outcome, |slots, value| slots.1 = Some(value), assemble)
    });

    output
}

/// Join three heterogeneous results. Same semantics as [`join2`].
///
/// # Example
/// ```
/// use quote_desk::engine::{join3, Deferred};
///
/// let listener = Deferred::<u16>::new();
/// let subscription = Deferred::<&str>::new();
/// let storage = Deferred::<()>::new();
/// let started = join3(&listener, &subscription, &storage);
///
/// storage.complete(());
/// listener.complete(8080);
/// subscription.complete("market");
/// assert_eq!(started.outcome(), Some(Ok((8080, "market", ()))));
/// ```
pub fn join3<A, B, C>(a: &Deferred<A>, b: &Deferred<B>, c: &Deferred<C>) -> Deferred<(A, B, C)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
{
    type Slots<A, B, C> = (Option<A>, Option<B>, Option<C>);
    fn assemble<A, B, C>(slots: &mut Slots<A, B, C>) -> Option<(A, B, C)> {
        Some((slots.0.take()?, slots.1.take()?, slots.2.take()?))
    }

    let output = Deferred::new();
    let state: SharedJoin<Slots<A, B, C>> = shared((None, None, None), 3);

    let (join, out) = (Arc::clone(&state), output.clone());
    a.on_outcome(move |outcome| {
        observe(&join, &out, outcome, |slots, value| slots.0 = Some(value), assemble)
    });
    let (join, out) = (Arc::clone(&state), output.clone());
    b.on_outcome(move |outcome| {
        observe(&join, &out, outcome, |slots, value| slots.1 = Some(value), assemble)
    });
    let (join, out) = (state, output.clone());
    c.on_outcome(move |outcome| {
        observe(&join, &out, outcome, |slots, value| slots.2 = Some(value), assemble)
    });

    output
}

/// Join any number of same-typed results, keeping input order in the output.
///
/// An empty input succeeds immediately with an empty vector.
pub fn join_all<T>(results: &[Deferred<T>]) -> Deferred<Vec<T>>
where
    T: Clone + Send + 'static,
{
    fn assemble<T>(slots: &mut Vec<Option<T>>) -> Option<Vec<T>> {
        slots.iter_mut().map(Option::take).collect()
    }

    if results.is_empty() {
        return Deferred::succeeded(Vec::new());
    }

    let output = Deferred::new();
    let slots: Vec<Option<T>> = results.iter().map(|_| None).collect();
    let state = shared(slots, results.len());

    for (index, result) in results.iter().enumerate() {
        let (join, out) = (Arc::clone(&state), output.clone());
        result.on_outcome(move |outcome| {
            observe(
                &join,
                &out,
                outcome,
                |slots: &mut Vec<Option<T>>, value| slots[index] = Some(value),
                assemble,
            )
        });
    }

    output
}
