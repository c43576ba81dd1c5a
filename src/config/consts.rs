// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default interface the HTTP listener binds
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
/// Default HTTP listener port
pub const DEFAULT_HTTP_PORT: u16 = 8080;
/// Default topic carrying market data
pub const DEFAULT_TOPIC: &str = "market";
/// Default per-subscriber buffer on the event bus
pub const DEFAULT_BUS_CAPACITY: usize = 1024;
/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "quote-desk.db";
/// Default bound on the blocking worker pool
pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;
/// Default interval between generated quotes (3 seconds)
pub const DEFAULT_GENERATOR_PERIOD_MS: u64 = 3_000;
/// Default exchange name stamped on generated quotes
pub const DEFAULT_EXCHANGE: &str = "quote desk exchange";
/// Default relative price movement per generated quote
pub const DEFAULT_VOLATILITY: f64 = 0.05;
/// Default number of shares per company
pub const DEFAULT_SHARES: u64 = 10_000;
