// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Seams to the collaborators the service drives: the network listener, the
//! message source and the storage backend.
//!
//! Each collaborator is an `async_trait` object so the orchestrator can be run
//! against real backends or test stubs. Next to every trait sits a leaf factory
//! turning its native async call into a [`Deferred`](crate::engine::Deferred),
//! so the combinators only ever see one abstraction.

pub mod listener;
pub mod source;
pub mod storage;

pub use listener::{Listener, ListenerHandle};
pub use source::{Message, MessageHandler, MessageSource, Subscription, SubscriptionHandle};
pub use storage::{Connection, ConnectionHandle, RowSet, Statement, StorageBackend};
