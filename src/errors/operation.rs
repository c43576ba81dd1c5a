// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failure causes carried by deferred results.

use thiserror::Error;

/// Why an asynchronous operation failed.
///
/// A cause travels unchanged from the leaf operation that produced it, through
/// every combinator, up to whoever reads the final outcome. It is `Clone` because
/// a settled result keeps its outcome for later inspection while also handing a
/// copy to its completion handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The network listener could not be bound.
    #[error("cannot bind listener on {address}: {reason}")]
    Bind { address: String, reason: String },

    /// The message source refused the subscription.
    #[error("cannot subscribe to topic '{topic}': {reason}")]
    Subscribe { topic: String, reason: String },

    /// No connection could be obtained from the storage backend.
    #[error("cannot acquire storage connection: {reason}")]
    Connect { reason: String },

    /// A statement was rejected by the storage backend.
    #[error("statement '{statement}' failed: {reason}")]
    Statement { statement: String, reason: String },

    /// A query was rejected by the storage backend.
    #[error("query '{statement}' failed: {reason}")]
    Query { statement: String, reason: String },

    /// A payload could not be decoded into a domain record.
    #[error("cannot decode record: {reason}")]
    Decode { reason: String },

    /// The connection was used after it had been closed.
    #[error("connection already closed")]
    ConnectionClosed,

    /// A blocking worker died before reporting an outcome.
    #[error("blocking worker lost: {reason}")]
    WorkerLost { reason: String },

    /// Startup was requested on an orchestrator that already ran it.
    #[error("startup already ran")]
    AlreadyStarted,
}

impl OperationError {
    pub fn statement(statement: &str, reason: impl ToString) -> Self {
        OperationError::Statement {
            statement: statement.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn query(statement: &str, reason: impl ToString) -> Self {
        OperationError::Query {
            statement: statement.to_string(),
            reason: reason.to_string(),
        }
    }
}
