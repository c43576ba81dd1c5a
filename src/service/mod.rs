// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The quote desk service built on the engine.
//!
//! - [`orchestrator`]: joins listener, subscription and schema readiness into one startup
//! - [`quotes`]: the current quote per name, fed by the steady-state handler
//! - [`operations`]: schema setup and persistence of received records
//! - [`api`]: the axum routes reading both
//! - [`generator`]: optional simulated market data published on the bus

pub mod api;
pub mod generator;
pub mod operations;
pub mod orchestrator;
pub mod quotes;

#[cfg(test)]
pub mod integration_tests;

pub use generator::MarketDataGenerator;
pub use orchestrator::{Orchestrator, Services, StartupSettings, StartupState};
pub use quotes::{Quote, QuoteBook};
