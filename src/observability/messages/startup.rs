// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the startup orchestrator.
//!
//! This module contains message types for logging events related to:
//! * Dispatch of the three readiness operations
//! * The transition to `Ready` or `Failed`
//! * Shutdown of a running service

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use tracing::Span;

/// Startup began: listener, subscription and storage operations dispatched.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use quote_desk::observability::messages::startup::StartupStarted;
///
/// let msg = StartupStarted {
///     port: 8080,
///     topic: "market",
///     drop_on_start: false,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct StartupStarted<'a> {
    pub port: u16,
    pub topic: &'a str,
    pub drop_on_start: bool,
}

impl Display for StartupStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting service: listener port={}, topic='{}', drop_on_start={}",
            self.port, self.topic, self.drop_on_start
        )
    }
}

impl StructuredLog for StartupStarted<'_> {
    fn log(&self) {
        tracing::info!(
            port = self.port,
            topic = self.topic,
            drop_on_start = self.drop_on_start,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "startup",
            span_name = name,
            port = self.port,
            topic = self.topic,
        )
    }
}

/// All readiness signals succeeded and the steady-state handler is wired.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StartupReady<'a> {
    pub address: SocketAddr,
    pub topic: &'a str,
}

impl Display for StartupReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service ready: serving on {}, consuming topic '{}'",
            self.address, self.topic
        )
    }
}

impl StructuredLog for StartupReady<'_> {
    fn log(&self) {
        tracing::info!(
            address = %self.address,
            topic = self.topic,
            "{}", self
        );
    }
}

/// A readiness signal failed; the service will not serve.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StartupFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for StartupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Service startup failed: {}", self.error)
    }
}

impl StructuredLog for StartupFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("startup_failed", span_name = name, error = %self.error)
    }
}

/// Shutdown was requested for a running service.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ShutdownRequested<'a> {
    pub reason: &'a str,
}

impl Display for ShutdownRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Shutting down: {}", self.reason)
    }
}

impl StructuredLog for ShutdownRequested<'_> {
    fn log(&self) {
        tracing::info!(reason = self.reason, "{}", self);
    }
}
