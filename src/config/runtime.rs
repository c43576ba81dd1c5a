// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio::runtime::{Builder, Runtime};

use crate::config::Config;
use crate::errors::ConfigError;

/// Runtime builder - turns configuration into the tokio runtime the service runs on.
///
/// The service runs on a single cooperative thread: every deferred result is
/// settled and every completion handler runs there. Blocking storage calls go
/// to tokio's blocking pool, bounded by `storage.worker_pool_size`.
///
/// # Examples
/// ```
/// use quote_desk::config::{Config, RuntimeBuilder};
///
/// let runtime = RuntimeBuilder::from_config(&Config::default()).unwrap();
/// let answer = runtime.block_on(async { 40 + 2 });
/// assert_eq!(answer, 42);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        Builder::new_current_thread()
            .enable_all()
            .max_blocking_threads(cfg.storage.worker_pool_size.max(1))
            .thread_name("quote-desk-worker")
            .build()
            .map_err(ConfigError::Runtime)
    }
}
