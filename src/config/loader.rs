// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BUS_CAPACITY, DEFAULT_DATABASE_PATH, DEFAULT_EXCHANGE, DEFAULT_GENERATOR_PERIOD_MS,
    DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_SHARES, DEFAULT_TOPIC, DEFAULT_VOLATILITY,
    DEFAULT_WORKER_POOL_SIZE,
};
use crate::errors::ConfigError;
use crate::observability::messages::{config::*, StructuredLog};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the service.
///
/// Every section is optional and falls back to built-in defaults, so an empty
/// file (or no file at all) yields a runnable service.
///
/// # Example
/// ```yaml
/// http:
///   host: 0.0.0.0
///   port: 8080
/// bus:
///   topic: market
///   capacity: 1024
/// storage:
///   path: quote-desk.db
///   drop_on_start: false
///   worker_pool_size: 4
/// generator:
///   enabled: true
///   period_ms: 3000
///   companies:
///     - name: Divinator
///       symbol: DVN
///       price: 500
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub bus: BusConfig,
    pub storage: StorageConfig,
    pub generator: GeneratorConfig,
}

/// Where the HTTP surface listens.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Event bus settings.
///
/// # Fields
/// * `topic` - Topic the service subscribes to and the generator publishes on
/// * `capacity` - Messages buffered per subscriber before it starts lagging
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    pub topic: String,
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

/// Storage backend settings.
///
/// # Fields
/// * `path` - SQLite database file
/// * `drop_on_start` - Drop the operations table before recreating it at startup
/// * `worker_pool_size` - Upper bound on threads running blocking storage calls
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub drop_on_start: bool,
    pub worker_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            drop_on_start: false,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
        }
    }
}

/// Market data generator settings. Disabled unless `enabled: true`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub enabled: bool,
    pub period_ms: u64,
    pub exchange: String,
    pub companies: Vec<CompanyConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_ms: DEFAULT_GENERATOR_PERIOD_MS,
            exchange: DEFAULT_EXCHANGE.to_string(),
            companies: vec![
                CompanyConfig::new("Divinator", "DVN", 500.0),
                CompanyConfig::new("MacroHard", "MCH", 400.0),
                CompanyConfig::new("Black Coat", "BCT", 300.0),
            ],
        }
    }
}

/// One simulated company.
///
/// # Fields
/// * `name` - Key under which quotes are recorded
/// * `symbol` - Ticker symbol
/// * `price` - Opening price
/// * `volatility` - Largest relative move per quote (defaults to 0.05)
/// * `shares` - Shares outstanding, upper bound for the traded volume
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CompanyConfig {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    #[serde(default = "default_shares")]
    pub shares: u64,
}

impl CompanyConfig {
    pub fn new(name: &str, symbol: &str, price: f64) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price,
            volatility: DEFAULT_VOLATILITY,
            shares: DEFAULT_SHARES,
        }
    }
}

fn default_volatility() -> f64 {
    DEFAULT_VOLATILITY
}

fn default_shares() -> u64 {
    DEFAULT_SHARES
}

/// Load a config from a YAML file, or a TOML file when the extension is `.toml`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cfg = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    Ok(cfg)
}

/// Load a config and reject it if it describes an unusable setup.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;

    if let Err(problems) = crate::config::validate_config(&cfg) {
        for problem in &problems {
            ConfigValidationFailed { problem }.log();
        }
        return Err(ConfigError::Invalid(problems));
    }

    ConfigLoaded {
        source: &path.display().to_string(),
    }
    .log();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
http:
  port: 9090
bus:
  topic: quotes
storage:
  path: /tmp/ops.db
  drop_on_start: true
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.http.port, 9090);
        assert_eq!(cfg.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(cfg.bus.topic, "quotes");
        assert_eq!(cfg.bus.capacity, DEFAULT_BUS_CAPACITY);
        assert!(cfg.storage.drop_on_start);
        assert_eq!(cfg.storage.path, PathBuf::from("/tmp/ops.db"));
        assert!(!cfg.generator.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.storage.worker_pool_size, DEFAULT_WORKER_POOL_SIZE);
        assert_eq!(cfg.generator.companies.len(), 3);
    }

    #[test]
    fn test_company_defaults() {
        let yaml = r#"
generator:
  enabled: true
  companies:
    - name: ACME
      symbol: ACM
      price: 10
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let company = &cfg.generator.companies[0];
        assert_eq!(company.volatility, DEFAULT_VOLATILITY);
        assert_eq!(company.shares, DEFAULT_SHARES);
        assert_eq!(company.price, 10.0);
    }

    #[test]
    fn test_load_toml_by_extension() {
        let file = write_temp(
            ".toml",
            r#"
[http]
port = 7070

[storage]
worker_pool_size = 2
"#,
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.http.port, 7070);
        assert_eq!(cfg.storage.worker_pool_size, 2);
    }

    #[test]
    fn test_load_and_validate_rejects_invalid_config() {
        let file = write_temp(
            ".yaml",
            r#"
bus:
  topic: ""
storage:
  worker_pool_size: 0
"#,
        );

        let error = load_and_validate_config(file.path()).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("bus topic must not be empty"));
        assert!(message.contains("worker_pool_size must be at least 1"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = load_config("does/not/exist.yaml").unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().contains("does/not/exist.yaml"));
    }
}
