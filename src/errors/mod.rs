// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod deferred;
mod operation;

pub use config::{ConfigError, ValidationError};
pub use deferred::DeferredError;
pub use operation::OperationError;
