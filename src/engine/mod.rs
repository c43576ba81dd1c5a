// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deferred-result composition engine.
//!
//! Every asynchronous operation in the service is represented by a
//! [`Deferred`]: a single-assignment cell settled exactly once and observed by
//! exactly one completion handler. Three combinators build larger results out
//! of smaller ones:
//!
//! * [`join2`] / [`join3`] / [`join_all`] - succeed when every input succeeds,
//!   fail on the first observed failure
//! * [`Chain`] / [`chain`] - run steps strictly in order, threading the value,
//!   short-circuiting on the first failure
//! * [`compose`] - run one continuation on success, forward failure untouched
//!
//! [`release_after`] adds the cleanup contract used around chains that hold a
//! resource: release it once the chain settles, whatever the outcome.

pub mod chain;
pub mod compose;
pub mod deferred;
pub mod join;

pub use chain::{chain, release_after, Chain, ChainStep};
pub use compose::compose;
pub use deferred::{Deferred, Outcome};
pub use join::{join2, join3, join_all};
