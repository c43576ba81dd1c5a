// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `startup` - orchestrator lifecycle and readiness
//! * `storage` - connections, schema setup and persisted operations
//! * `bus` - subscriptions, inbound messages and the market data generator
//! * `http` - listener lifecycle and request failures
//! * `config` - configuration loading and validation

use std::fmt::Display;
use tracing::Span;

pub mod bus;
pub mod config;
pub mod http;
pub mod startup;
pub mod storage;

/// A log message that knows its level and its structured fields.
pub trait StructuredLog: Display {
    /// Emit the event at the message's documented level.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("event", span_name = name, message = %self)
    }
}
