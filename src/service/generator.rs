// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Simulated market data.
//!
//! Each configured company gets a random walk on its value. Every period the
//! generator publishes one quote per company on the bus topic, which the
//! steady-state handler then records like any other inbound message.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backends::EventBus;
use crate::config::{CompanyConfig, Config};
use crate::observability::messages::{bus::*, StructuredLog};

/// Floor for a simulated value.
const MIN_VALUE: f64 = 1.0;
/// Largest bid/ask distance from the value, relative to it.
const MAX_SPREAD: f64 = 0.01;

struct Company {
    config: CompanyConfig,
    value: f64,
}

impl Company {
    fn new(config: CompanyConfig) -> Self {
        let value = config.price.max(MIN_VALUE);
        Self { config, value }
    }

    fn next_quote(&mut self, rng: &mut StdRng, exchange: &str) -> Value {
        let volatility = self.config.volatility;
        let change = rng.gen_range(-volatility..=volatility);
        self.value = (self.value * (1.0 + change)).max(MIN_VALUE);

        let spread = self.value * rng.gen_range(0.0..=MAX_SPREAD);
        let volume = rng.gen_range(0..=self.config.shares);

        json!({
            "name": self.config.name,
            "symbol": self.config.symbol,
            "exchange": exchange,
            "value": self.value,
            "bid": (self.value - spread).max(0.0),
            "ask": self.value + spread,
            "open": self.config.price,
            "volume": volume,
            "shares": self.config.shares,
        })
    }
}

pub struct MarketDataGenerator {
    topic: String,
    exchange: String,
    period: Duration,
    companies: Vec<Company>,
    rng: StdRng,
}

impl MarketDataGenerator {
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }

    /// Deterministic generator, for reproducible runs.
    pub fn seeded(cfg: &Config, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: &Config, rng: StdRng) -> Self {
        Self {
            topic: cfg.bus.topic.clone(),
            exchange: cfg.generator.exchange.clone(),
            period: Duration::from_millis(cfg.generator.period_ms.max(1)),
            companies: cfg
                .generator
                .companies
                .iter()
                .cloned()
                .map(Company::new)
                .collect(),
            rng,
        }
    }

    /// Publish one quote per company, returning them in company order.
    pub fn tick(&mut self, bus: &EventBus) -> Vec<Value> {
        let mut published = Vec::with_capacity(self.companies.len());
        for company in &mut self.companies {
            let quote = company.next_quote(&mut self.rng, &self.exchange);
            let receivers = bus.publish(&self.topic, quote.clone());
            QuotePublished {
                symbol: &company.config.symbol,
                value: company.value,
                receivers,
            }
            .log();
            published.push(quote);
        }
        published
    }

    /// Tick every period until `stop` is cancelled.
    pub fn spawn(mut self, bus: Arc<EventBus>, stop: CancellationToken) -> JoinHandle<()> {
        GeneratorStarted {
            topic: &self.topic,
            companies: self.companies.len(),
            period_ms: self.period.as_millis() as u64,
        }
        .log();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        self.tick(&bus);
                    }
                }
            }
        })
    }
}
