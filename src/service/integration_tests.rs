// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::backends::stub::ScriptedStorage;
use crate::backends::{EventBus, HttpListener, SqliteStorage};
use crate::config::Config;
use crate::errors::OperationError;
use crate::service::api;
use crate::service::operations::{
    initialize_database, recent_operations, store_operation, CREATE_TABLE, RECENT_LIMIT,
};
use crate::service::{Orchestrator, QuoteBook, StartupSettings, StartupState};
use crate::traits::StorageBackend;

/// End-to-end startup and steady state against real SQLite, a real bus and
/// the real HTTP listener bound on an ephemeral port.
#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &TempDir) -> Config {
        let mut cfg = Config::default();
        cfg.http.host = "127.0.0.1".to_string();
        cfg.http.port = 0;
        cfg.storage.path = dir.path().join("quote-desk.db");
        cfg
    }

    async fn fetch(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    /// Poll until `ready` holds; steady-state work is fire-and-forget.
    async fn eventually(mut ready: impl FnMut() -> bool) {
        for _ in 0..200 {
            if ready() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    async fn stored_count(storage: &Arc<dyn StorageBackend>, expected: usize) -> Vec<Value> {
        for _ in 0..200 {
            if let Ok(records) = recent_operations(storage).wait().await {
                if records.len() >= expected {
                    return records;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {expected} stored records");
    }

    #[tokio::test]
    async fn test_startup_then_quote_lookup() {
        let dir = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new(64));
        let orchestrator = Orchestrator::from_config(&config(&dir), Arc::clone(&bus));

        let services = orchestrator.start().wait().await.unwrap();
        assert_eq!(orchestrator.state(), StartupState::Ready);
        assert_ne!(services.listener.local_addr().port(), 0);

        bus.publish("market", json!({"name": "ACME", "value": 10}));
        eventually(|| orchestrator.quotes().get("ACME").is_some()).await;

        let (status, body) = fetch(orchestrator.router(), "/quotes?name=ACME").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"name": "ACME", "value": 10})
        );

        let (status, body) = fetch(orchestrator.router(), "/quotes?name=UNKNOWN").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());

        services.shutdown();
    }

    #[tokio::test]
    async fn test_create_table_failure_fails_startup() {
        let storage = ScriptedStorage::failing_on("CREATE TABLE");
        let orchestrator = Orchestrator::new(
            StartupSettings {
                port: 0,
                topic: "market".to_string(),
                drop_on_start: false,
            },
            Arc::new(HttpListener::new("127.0.0.1", Router::new())),
            Arc::new(EventBus::new(8)),
            Arc::new(storage.clone()),
            QuoteBook::new(),
        );

        let outcome = orchestrator.start().wait().await;

        let cause = OperationError::statement(CREATE_TABLE, "scripted failure");
        assert_eq!(outcome.err(), Some(cause.clone()));
        assert_eq!(orchestrator.state(), StartupState::Failed(cause));
        assert_eq!(storage.acquired(), 1);
        assert_eq!(storage.closed(), 1);
    }

    #[tokio::test]
    async fn test_all_quotes_keyed_by_name() {
        let dir = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new(64));
        let orchestrator = Orchestrator::from_config(&config(&dir), Arc::clone(&bus));
        let services = orchestrator.start().wait().await.unwrap();

        bus.publish("market", json!({"name": "ACME", "value": 10}));
        bus.publish("market", json!({"name": "FOO", "value": 1}));
        bus.publish("market", json!({"name": "ACME", "value": 12}));
        eventually(|| {
            orchestrator
                .quotes()
                .get("ACME")
                .is_some_and(|quote| quote.fields.get("value") == Some(&json!(12)))
                && orchestrator.quotes().get("FOO").is_some()
        })
        .await;

        let (status, body) = fetch(orchestrator.router(), "/quotes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({
                "ACME": {"name": "ACME", "value": 12},
                "FOO": {"name": "FOO", "value": 1},
            })
        );

        services.shutdown();
    }

    #[tokio::test]
    async fn test_undecodable_messages_are_skipped() {
        let dir = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new(64));
        let orchestrator = Orchestrator::from_config(&config(&dir), Arc::clone(&bus));
        let services = orchestrator.start().wait().await.unwrap();

        bus.publish("market", json!({"value": 10}));
        bus.publish("market", json!("ACME"));
        bus.publish("market", json!({"name": "BAR", "value": 3}));
        eventually(|| orchestrator.quotes().get("BAR").is_some()).await;

        assert_eq!(orchestrator.quotes().len(), 1);
        services.shutdown();
    }

    #[tokio::test]
    async fn test_operations_returns_newest_first_and_capped() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn StorageBackend> =
            Arc::new(SqliteStorage::new(dir.path().join("quote-desk.db")));
        initialize_database(&storage, false).wait().await.unwrap();

        for index in 0..12 {
            let record = json!({"name": format!("Q{index:02}"), "value": index});
            store_operation(&storage, &record).wait().await.unwrap();
        }

        let app = api::router(QuoteBook::new(), Arc::clone(&storage));
        let (status, body) = fetch(app, "/operations").await;
        let records: Vec<Value> = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(records.len(), RECENT_LIMIT);
        assert_eq!(records[0], json!({"name": "Q11", "value": 11}));
        assert_eq!(records[RECENT_LIMIT - 1], json!({"name": "Q02", "value": 2}));
    }

    #[tokio::test]
    async fn test_received_quotes_are_stored() {
        let dir = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new(64));
        let cfg = config(&dir);
        let orchestrator = Orchestrator::from_config(&cfg, Arc::clone(&bus));
        let services = orchestrator.start().wait().await.unwrap();

        bus.publish("market", json!({"name": "ACME", "value": 10}));
        bus.publish("market", json!({"name": "FOO", "value": 1}));

        let storage: Arc<dyn StorageBackend> = Arc::new(SqliteStorage::new(&cfg.storage.path));
        let mut stored = stored_count(&storage, 2).await;
        stored.sort_by_key(|record| record["name"].as_str().map(str::to_string));
        assert_eq!(
            stored,
            vec![
                json!({"name": "ACME", "value": 10}),
                json!({"name": "FOO", "value": 1}),
            ]
        );

        services.shutdown();
    }

    #[tokio::test]
    async fn test_restart_with_drop_clears_operations() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir);

        let bus = Arc::new(EventBus::new(64));
        let first = Orchestrator::from_config(&cfg, Arc::clone(&bus));
        let services = first.start().wait().await.unwrap();
        bus.publish("market", json!({"name": "ACME", "value": 10}));

        let storage: Arc<dyn StorageBackend> = Arc::new(SqliteStorage::new(&cfg.storage.path));
        assert_eq!(stored_count(&storage, 1).await.len(), 1);
        services.shutdown();

        cfg.storage.drop_on_start = true;
        let second = Orchestrator::from_config(&cfg, Arc::new(EventBus::new(8)));
        let services = second.start().wait().await.unwrap();

        assert!(recent_operations(&storage).wait().await.unwrap().is_empty());
        services.shutdown();
    }

    #[tokio::test]
    async fn test_failed_stores_do_not_stop_message_handling() {
        let storage = ScriptedStorage::failing_on("INSERT");
        let bus = Arc::new(EventBus::new(8));
        let orchestrator = Orchestrator::new(
            StartupSettings {
                port: 0,
                topic: "market".to_string(),
                drop_on_start: false,
            },
            Arc::new(HttpListener::new("127.0.0.1", Router::new())),
            bus.clone(),
            Arc::new(storage.clone()),
            QuoteBook::new(),
        );
        let services = orchestrator.start().wait().await.unwrap();

        bus.publish("market", json!({"name": "ACME", "value": 10}));
        bus.publish("market", json!({"name": "FOO", "value": 1}));

        eventually(|| orchestrator.quotes().len() == 2 && storage.closed() == 3).await;
        let inserts = storage
            .statements()
            .into_iter()
            .filter(|sql| sql.starts_with("INSERT"))
            .count();
        assert_eq!(inserts, 2);
        assert_eq!(orchestrator.state(), StartupState::Ready);
        assert!(!services.listener.is_shut_down());

        services.shutdown();
    }
}
