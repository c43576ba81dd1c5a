// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use quote_desk::backends::EventBus;
use quote_desk::config::{load_and_validate_config, Config, RuntimeBuilder};
use quote_desk::observability::messages::{config::ConfigLoaded, startup::*, StructuredLog};
use quote_desk::service::{MarketDataGenerator, Orchestrator};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 || args.get(1).is_some_and(|arg| arg == "--help") {
        eprintln!("Usage: {} [config.yaml|config.toml]", args[0]);
        eprintln!("Example: {} configs/quote-desk.yaml", args[0]);
        return ExitCode::FAILURE;
    }

    match run(args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("quote-desk failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let cfg = match config_path {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("invalid configuration in {path}"))?,
        None => {
            ConfigLoaded { source: "defaults" }.log();
            Config::default()
        }
    };

    let runtime = RuntimeBuilder::from_config(&cfg)?;
    runtime.block_on(serve(cfg))
}

async fn serve(cfg: Config) -> anyhow::Result<()> {
    let bus = Arc::new(EventBus::new(cfg.bus.capacity));
    let orchestrator = Orchestrator::from_config(&cfg, Arc::clone(&bus));

    let services = match orchestrator.start().wait().await {
        Ok(services) => services,
        // Already logged by the orchestrator.
        Err(cause) => return Err(cause).context("startup failed"),
    };

    let stop = CancellationToken::new();
    let generator = cfg
        .generator
        .enabled
        .then(|| MarketDataGenerator::from_config(&cfg).spawn(Arc::clone(&bus), stop.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("cannot listen for ctrl-c")?;
    ShutdownRequested { reason: "ctrl-c" }.log();

    stop.cancel();
    if let Some(generator) = generator {
        generator.await.context("generator task failed")?;
    }
    services.shutdown();
    bus.close();
    Ok(())
}
