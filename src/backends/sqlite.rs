// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! SQLite storage backend.
//!
//! `rusqlite` is synchronous, so every call runs on the runtime's blocking
//! pool. Each acquired connection is a fresh `rusqlite::Connection` on the
//! configured file; WAL mode lets the steady-state writers and the
//! `/operations` reader share it.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::errors::OperationError;
use crate::observability::messages::{storage::*, StructuredLog};
use crate::traits::{Connection, ConnectionHandle, RowSet, Statement, StorageBackend};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const BACKEND_NAME: &str = "sqlite";

pub struct SqliteStorage {
    path: PathBuf,
}

impl SqliteStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn acquire_connection(&self) -> Result<ConnectionHandle, OperationError> {
        let path = self.path.clone();
        let connection = blocking(move || open(&path)).await??;

        ConnectionAcquired {
            backend: BACKEND_NAME,
            location: &self.path.display().to_string(),
        }
        .log();

        Ok(Arc::new(SqliteConnection {
            inner: Arc::new(Mutex::new(Some(connection))),
        }))
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }
}

fn open(path: &std::path::Path) -> Result<rusqlite::Connection, OperationError> {
    let connect_error = |err: rusqlite::Error| OperationError::Connect {
        reason: err.to_string(),
    };

    let connection = rusqlite::Connection::open(path).map_err(connect_error)?;
    connection.busy_timeout(BUSY_TIMEOUT).map_err(connect_error)?;
    // journal_mode returns the resulting mode as a row.
    connection
        .query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))
        .map_err(connect_error)?;
    Ok(connection)
}

/// Run `work` on the blocking pool, mapping a lost worker to an operation error.
async fn blocking<T, F>(work: F) -> Result<T, OperationError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| OperationError::WorkerLost {
            reason: err.to_string(),
        })
}

type Shared = Arc<Mutex<Option<rusqlite::Connection>>>;

struct SqliteConnection {
    inner: Shared,
}

impl SqliteConnection {
    async fn with_connection<T, F>(&self, work: F) -> Result<T, OperationError>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> Result<T, OperationError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        blocking(move || {
            let guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                Some(connection) => work(connection),
                None => Err(OperationError::ConnectionClosed),
            }
        })
        .await?
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn execute(&self, statement: Statement) -> Result<(), OperationError> {
        self.with_connection(move |connection| {
            connection
                .execute(statement.sql(), rusqlite::params_from_iter(statement.params()))
                .map(|_| ())
                .map_err(|err| OperationError::statement(statement.sql(), err))
        })
        .await
    }

    async fn query(&self, statement: Statement) -> Result<RowSet, OperationError> {
        self.with_connection(move |connection| {
            read_rows(connection, &statement)
                .map_err(|err| OperationError::query(statement.sql(), err))
        })
        .await
    }

    fn close(&self) {
        let taken = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(connection) = taken else {
            return;
        };

        let release = move || match connection.close() {
            Ok(()) => ConnectionReleased {
                backend: BACKEND_NAME,
            }
            .log(),
            Err((_, err)) => ConnectionCloseFailed {
                backend: BACKEND_NAME,
                error: &err,
            }
            .log(),
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(release);
            }
            Err(_) => release(),
        }
    }
}

fn read_rows(connection: &rusqlite::Connection, statement: &Statement) -> rusqlite::Result<RowSet> {
    let mut prepared = connection.prepare(statement.sql())?;
    let columns: Vec<String> = prepared
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut rows = prepared.query(rusqlite::params_from_iter(statement.params()))?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for index in 0..width {
            cells.push(to_json(row.get_ref(index)?));
        }
        collected.push(cells);
    }

    Ok(RowSet {
        columns,
        rows: collected,
    })
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => Value::from(real),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(String::from_utf8_lossy(blob).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> SqliteStorage {
        SqliteStorage::new(dir.path().join("operations.db"))
    }

    #[tokio::test]
    async fn test_execute_and_query_round_trip() {
        let dir = TempDir::new().unwrap();
        let connection = storage(&dir).acquire_connection().await.unwrap();

        connection
            .execute(Statement::new(
                "CREATE TABLE operations (id INTEGER PRIMARY KEY AUTOINCREMENT, operation TEXT NOT NULL)",
            ))
            .await
            .unwrap();
        for name in ["ACME", "FOO"] {
            connection
                .execute(
                    Statement::new("INSERT INTO operations (operation) VALUES (?1)")
                        .bind(format!(r#"{{"name":"{name}"}}"#)),
                )
                .await
                .unwrap();
        }

        let rows = connection
            .query(Statement::new("SELECT id, operation FROM operations ORDER BY id DESC"))
            .await
            .unwrap();

        assert_eq!(rows.columns, vec!["id".to_string(), "operation".to_string()]);
        assert_eq!(
            rows.rows,
            vec![
                vec![json!(2), json!(r#"{"name":"FOO"}"#)],
                vec![json!(1), json!(r#"{"name":"ACME"}"#)],
            ]
        );
        connection.close();
    }

    #[tokio::test]
    async fn test_statement_error_carries_sql() {
        let dir = TempDir::new().unwrap();
        let connection = storage(&dir).acquire_connection().await.unwrap();

        let error = connection
            .execute(Statement::new("INSERT INTO missing (operation) VALUES ('x')"))
            .await
            .unwrap_err();

        match error {
            OperationError::Statement { statement, reason } => {
                assert_eq!(statement, "INSERT INTO missing (operation) VALUES ('x')");
                assert!(reason.contains("missing"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_connection_rejects_work() {
        let dir = TempDir::new().unwrap();
        let connection = storage(&dir).acquire_connection().await.unwrap();

        connection.close();
        connection.close();

        let error = connection.execute(Statement::new("SELECT 1")).await.unwrap_err();
        assert_eq!(error, OperationError::ConnectionClosed);
    }

    #[tokio::test]
    async fn test_unreachable_path_fails_to_connect() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteStorage::new(dir.path().join("no-such-dir").join("operations.db"));

        let error = backend.acquire_connection().await.err().unwrap();
        assert!(matches!(error, OperationError::Connect { .. }));
    }
}
