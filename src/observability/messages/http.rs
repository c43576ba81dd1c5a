// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the HTTP listener and request handling.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use tracing::Span;

/// The listener is bound and serving.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ListenerBound {
    pub address: SocketAddr,
}

impl Display for ListenerBound {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "HTTP listener bound on {}", self.address)
    }
}

impl StructuredLog for ListenerBound {
    fn log(&self) {
        tracing::info!(address = %self.address, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("listener", span_name = name, address = %self.address)
    }
}

/// The listener stopped serving, cleanly or not.
///
/// # Log Level
/// `info!` on clean shutdown, `error!` when serving failed
pub struct ListenerStopped<'a> {
    pub address: SocketAddr,
    pub error: Option<&'a dyn std::error::Error>,
}

impl Display for ListenerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.error {
            Some(error) => write!(f, "HTTP listener on {} failed: {}", self.address, error),
            None => write!(f, "HTTP listener on {} stopped", self.address),
        }
    }
}

impl StructuredLog for ListenerStopped<'_> {
    fn log(&self) {
        match self.error {
            Some(error) => tracing::error!(address = %self.address, error = %error, "{}", self),
            None => tracing::info!(address = %self.address, "{}", self),
        }
    }
}

/// A request could not be served because a backing operation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RequestFailed<'a> {
    pub route: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RequestFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Request to {} failed: {}", self.route, self.error)
    }
}

impl StructuredLog for RequestFailed<'_> {
    fn log(&self) {
        tracing::error!(route = self.route, error = %self.error, "{}", self);
    }
}
