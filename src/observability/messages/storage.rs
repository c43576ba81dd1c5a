// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the storage backend and persisted operations.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A storage connection was opened.
///
/// # Log Level
/// `debug!` - Per-operation detail
pub struct ConnectionAcquired<'a> {
    pub backend: &'a str,
    pub location: &'a str,
}

impl Display for ConnectionAcquired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Acquired {} connection to {}", self.backend, self.location)
    }
}

impl StructuredLog for ConnectionAcquired<'_> {
    fn log(&self) {
        tracing::debug!(backend = self.backend, location = self.location, "{}", self);
    }
}

/// A storage connection was released.
///
/// # Log Level
/// `debug!` - Per-operation detail
pub struct ConnectionReleased<'a> {
    pub backend: &'a str,
}

impl Display for ConnectionReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Released {} connection", self.backend)
    }
}

impl StructuredLog for ConnectionReleased<'_> {
    fn log(&self) {
        tracing::debug!(backend = self.backend, "{}", self);
    }
}

/// Closing a connection reported an error. The connection is gone either way.
///
/// # Log Level
/// `warn!` - Unexpected but handled
pub struct ConnectionCloseFailed<'a> {
    pub backend: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ConnectionCloseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Closing {} connection failed: {}", self.backend, self.error)
    }
}

impl StructuredLog for ConnectionCloseFailed<'_> {
    fn log(&self) {
        tracing::warn!(backend = self.backend, error = %self.error, "{}", self);
    }
}

/// Schema setup finished.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use quote_desk::observability::messages::storage::DatabaseInitialized;
///
/// let msg = DatabaseInitialized { dropped: true };
/// assert_eq!(msg.to_string(), "Database initialized (table dropped and recreated)");
/// ```
pub struct DatabaseInitialized {
    pub dropped: bool,
}

impl Display for DatabaseInitialized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.dropped {
            write!(f, "Database initialized (table dropped and recreated)")
        } else {
            write!(f, "Database initialized")
        }
    }
}

impl StructuredLog for DatabaseInitialized {
    fn log(&self) {
        tracing::info!(dropped = self.dropped, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("database_initialized", span_name = name, dropped = self.dropped)
    }
}

/// Persisting one inbound record failed. Best effort: the record is not retried.
///
/// # Log Level
/// `warn!` - Unexpected but handled
pub struct OperationStoreFailed<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for OperationStoreFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dropping operation for '{}': {}", self.name, self.error)
    }
}

impl StructuredLog for OperationStoreFailed<'_> {
    fn log(&self) {
        tracing::warn!(name = self.name, error = %self.error, "{}", self);
    }
}
