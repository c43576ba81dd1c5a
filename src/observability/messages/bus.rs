// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the event bus, its subscribers and the market data generator.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A subscriber fell behind and the bus discarded messages for it.
///
/// # Log Level
/// `warn!` - Unexpected but handled
pub struct SubscriberLagged<'a> {
    pub topic: &'a str,
    pub skipped: u64,
}

impl Display for SubscriberLagged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Subscriber on '{}' lagged, {} messages skipped",
            self.topic, self.skipped
        )
    }
}

impl StructuredLog for SubscriberLagged<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, skipped = self.skipped, "{}", self);
    }
}

/// An inbound message was not a valid record and was ignored.
///
/// # Log Level
/// `warn!` - Unexpected but handled
pub struct MessageDecodeFailed<'a> {
    pub topic: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MessageDecodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring message on '{}': {}", self.topic, self.error)
    }
}

impl StructuredLog for MessageDecodeFailed<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, error = %self.error, "{}", self);
    }
}

/// The generator published a fresh quote.
///
/// # Log Level
/// `trace!` - High-volume detail
pub struct QuotePublished<'a> {
    pub symbol: &'a str,
    pub value: f64,
    pub receivers: usize,
}

impl Display for QuotePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Published {} at {:.2} to {} receivers",
            self.symbol, self.value, self.receivers
        )
    }
}

impl StructuredLog for QuotePublished<'_> {
    fn log(&self) {
        tracing::trace!(
            symbol = self.symbol,
            value = self.value,
            receivers = self.receivers,
            "{}", self
        );
    }
}

/// The market data generator started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GeneratorStarted<'a> {
    pub topic: &'a str,
    pub companies: usize,
    pub period_ms: u64,
}

impl Display for GeneratorStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generating quotes for {} companies on '{}' every {}ms",
            self.companies, self.topic, self.period_ms
        )
    }
}

impl StructuredLog for GeneratorStarted<'_> {
    fn log(&self) {
        tracing::info!(
            topic = self.topic,
            companies = self.companies,
            period_ms = self.period_ms,
            "{}", self
        );
    }
}
