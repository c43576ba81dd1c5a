// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::engine::Deferred;
use crate::errors::OperationError;

/// A statement with positional text parameters (`?1`, `?2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append the next positional parameter.
    pub fn bind(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Rows returned by a query, cells converted to JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().filter_map(move |row| row.get(index)))
    }
}

/// A connection owned by exactly one caller until closed.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn execute(&self, statement: Statement) -> Result<(), OperationError>;

    async fn query(&self, statement: Statement) -> Result<RowSet, OperationError>;

    /// Release the connection. Fire-and-forget; later calls fail with
    /// [`OperationError::ConnectionClosed`].
    fn close(&self);
}

pub type ConnectionHandle = Arc<dyn Connection>;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn acquire_connection(&self) -> Result<ConnectionHandle, OperationError>;

    fn name(&self) -> &'static str;
}

/// Leaf factory: obtain a connection from `backend`.
pub fn acquire_connection(backend: &Arc<dyn StorageBackend>) -> Deferred<ConnectionHandle> {
    let backend = Arc::clone(backend);
    Deferred::spawn(async move { backend.acquire_connection().await })
}

/// Leaf factory: run a statement that returns no rows.
pub fn execute(connection: &ConnectionHandle, statement: Statement) -> Deferred<()> {
    let connection = Arc::clone(connection);
    Deferred::spawn(async move { connection.execute(statement).await })
}

/// Leaf factory: run a query.
pub fn query(connection: &ConnectionHandle, statement: Statement) -> Deferred<RowSet> {
    let connection = Arc::clone(connection);
    Deferred::spawn(async move { connection.query(statement).await })
}
