// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // http, bus, sqlite
pub mod config;     // config + runtime
pub mod engine;     // deferred results and combinators
pub mod errors;     // error handling
pub mod observability;
pub mod service;    // startup orchestration, quotes, operations
pub mod traits;     // collaborator seams
