// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file parsed but describes an unusable setup.
    #[error("Configuration validation failed:\n{}", join_problems(.0))]
    Invalid(Vec<ValidationError>),

    #[error("cannot build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

fn join_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single problem found while validating a parsed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bus topic must not be empty")]
    EmptyTopic,

    #[error("bus capacity must be at least 1")]
    ZeroBusCapacity,

    #[error("storage worker_pool_size must be at least 1")]
    ZeroWorkerPool,

    #[error("generator period_ms must be at least 1")]
    ZeroGeneratorPeriod,

    #[error("generator is enabled but lists no companies")]
    NoCompanies,

    #[error("duplicate company name: '{name}'")]
    DuplicateCompany { name: String },

    #[error("company '{name}' must have a positive price")]
    NonPositivePrice { name: String },

    #[error("company '{name}' volatility must be within [0, 1)")]
    VolatilityOutOfRange { name: String },
}
