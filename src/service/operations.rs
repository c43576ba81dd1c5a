// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Storage operations on the `operations` table.
//!
//! Every operation acquires its own connection and releases it once the last
//! statement settles, whatever the outcome.

use serde_json::Value;
use std::sync::Arc;

use crate::engine::{compose, release_after, Chain, Deferred};
use crate::observability::messages::{storage::DatabaseInitialized, StructuredLog};
use crate::traits::storage::{acquire_connection, execute, query};
use crate::traits::{ConnectionHandle, RowSet, Statement, StorageBackend};

pub const DROP_TABLE: &str = "DROP TABLE IF EXISTS operations";
pub const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS operations (id INTEGER PRIMARY KEY AUTOINCREMENT, operation TEXT NOT NULL)";
pub const INSERT_OPERATION: &str = "INSERT INTO operations (operation) VALUES (?1)";
pub const RECENT_OPERATIONS: &str = "SELECT operation FROM operations ORDER BY id DESC LIMIT 10";

/// Number of records returned by [`recent_operations`].
pub const RECENT_LIMIT: usize = 10;

fn release(connection: ConnectionHandle) {
    connection.close();
}

/// Prepare the schema: acquire, optionally drop, create, release.
pub fn initialize_database(storage: &Arc<dyn StorageBackend>, drop_on_start: bool) -> Deferred<()> {
    let acquired = acquire_connection(storage);

    let created = Chain::new(acquired.clone())
        .then_if(drop_on_start, |connection| {
            execute(&connection, Statement::new(DROP_TABLE)).map(move |()| connection)
        })
        .then(|connection| execute(&connection, Statement::new(CREATE_TABLE)))
        .into_deferred();

    release_after(&created, &acquired, release).map(move |()| {
        DatabaseInitialized {
            dropped: drop_on_start,
        }
        .log();
    })
}

/// Persist one record. Steady-state callers fire this and only log the outcome.
pub fn store_operation(storage: &Arc<dyn StorageBackend>, record: &Value) -> Deferred<()> {
    let acquired = acquire_connection(storage);
    let statement = Statement::new(INSERT_OPERATION).bind(record.to_string());

    let stored = Deferred::new();
    compose(
        &acquired,
        move |connection| execute(&connection, statement),
        stored.clone(),
    );

    release_after(&stored, &acquired, release)
}

/// The most recent stored records, newest first.
pub fn recent_operations(storage: &Arc<dyn StorageBackend>) -> Deferred<Vec<Value>> {
    let acquired = acquire_connection(storage);
    let rows = acquired.and_then(|connection| query(&connection, Statement::new(RECENT_OPERATIONS)));

    release_after(&rows, &acquired, release).map(decode_operations)
}

/// Stored text that is not JSON is returned as a plain string.
fn decode_operations(rows: RowSet) -> Vec<Value> {
    let Some(cells) = rows.column("operation") else {
        return Vec::new();
    };
    cells
        .map(|cell| match cell {
            Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| cell.clone()),
            other => other.clone(),
        })
        .collect()
}
