// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Parsing only guarantees the shape of the document. These checks reject
//! settings that would make startup fail in less obvious ways later: a zero
//! capacity bus channel panics, a zero-sized blocking pool never runs storage
//! calls, a zero period generator spins.
//!
//! All problems are collected rather than stopping at the first one.

use std::collections::HashSet;

use crate::config::Config;
use crate::errors::ValidationError;

pub fn validate_config(cfg: &Config) -> Result<(), Vec<ValidationError>> {
    let mut problems = Vec::new();

    if cfg.bus.topic.trim().is_empty() {
        problems.push(ValidationError::EmptyTopic);
    }
    if cfg.bus.capacity == 0 {
        problems.push(ValidationError::ZeroBusCapacity);
    }
    if cfg.storage.worker_pool_size == 0 {
        problems.push(ValidationError::ZeroWorkerPool);
    }

    if cfg.generator.enabled {
        if cfg.generator.period_ms == 0 {
            problems.push(ValidationError::ZeroGeneratorPeriod);
        }
        if cfg.generator.companies.is_empty() {
            problems.push(ValidationError::NoCompanies);
        }
    }

    let mut seen = HashSet::new();
    for company in &cfg.generator.companies {
        if !seen.insert(company.name.as_str()) {
            problems.push(ValidationError::DuplicateCompany {
                name: company.name.clone(),
            });
        }
        if !(company.price > 0.0) {
            problems.push(ValidationError::NonPositivePrice {
                name: company.name.clone(),
            });
        }
        if !(0.0..1.0).contains(&company.volatility) {
            problems.push(ValidationError::VolatilityOutOfRange {
                name: company.name.clone(),
            });
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompanyConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&Config::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_problem() {
        let mut cfg = Config::default();
        cfg.bus.topic = "  ".to_string();
        cfg.bus.capacity = 0;
        cfg.storage.worker_pool_size = 0;

        let problems = validate_config(&cfg).unwrap_err();
        assert_eq!(
            problems,
            vec![
                ValidationError::EmptyTopic,
                ValidationError::ZeroBusCapacity,
                ValidationError::ZeroWorkerPool,
            ]
        );
    }

    #[test]
    fn test_generator_checks_only_when_enabled() {
        let mut cfg = Config::default();
        cfg.generator.period_ms = 0;
        cfg.generator.companies.clear();
        assert_eq!(validate_config(&cfg), Ok(()));

        cfg.generator.enabled = true;
        let problems = validate_config(&cfg).unwrap_err();
        assert!(problems.contains(&ValidationError::ZeroGeneratorPeriod));
        assert!(problems.contains(&ValidationError::NoCompanies));
    }

    #[test]
    fn test_company_problems() {
        let mut cfg = Config::default();
        let mut volatile = CompanyConfig::new("Wild", "WLD", 5.0);
        volatile.volatility = 1.5;
        cfg.generator.companies = vec![
            CompanyConfig::new("ACME", "ACM", 10.0),
            CompanyConfig::new("ACME", "AC2", 0.0),
            volatile,
        ];

        let problems = validate_config(&cfg).unwrap_err();
        assert_eq!(
            problems,
            vec![
                ValidationError::DuplicateCompany {
                    name: "ACME".to_string()
                },
                ValidationError::NonPositivePrice {
                    name: "ACME".to_string()
                },
                ValidationError::VolatilityOutOfRange {
                    name: "Wild".to_string()
                },
            ]
        );
    }
}
