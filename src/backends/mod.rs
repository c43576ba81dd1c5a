// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete implementations of the capability traits.
//!
//! - [`http::HttpListener`]: an axum router served from a tokio TCP listener.
//! - [`bus::EventBus`]: an in-process publish/subscribe bus on tokio broadcast channels.
//! - [`sqlite::SqliteStorage`]: SQLite through rusqlite, run on the blocking pool.
//!
//! The `stub` module (test builds only) provides listeners, sources and
//! storage that fail or record on demand.

pub mod bus;
pub mod http;
pub mod sqlite;
#[cfg(test)]
pub mod stub;

pub use bus::EventBus;
pub use http::HttpListener;
pub use sqlite::SqliteStorage;
