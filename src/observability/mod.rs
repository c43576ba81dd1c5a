// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic and operational log line in the service is produced by a
//! message type from [`messages`]. Message types are plain structs with a
//! `Display` implementation and a [`messages::StructuredLog`] implementation,
//! which keeps wording in one place and attaches structured fields to each
//! event.
//!
//! # Usage
//!
//! ```rust
//! use quote_desk::observability::messages::StructuredLog;
//! use quote_desk::observability::messages::startup::StartupFailed;
//! use quote_desk::errors::OperationError;
//!
//! let error = OperationError::ConnectionClosed;
//! StartupFailed { error: &error }.log();
//! ```

pub mod messages;
