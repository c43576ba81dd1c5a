// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::OperationError;
use crate::traits::{
    Connection, ConnectionHandle, Listener, ListenerHandle, MessageSource, RowSet, Statement,
    StorageBackend, SubscriptionHandle,
};

/// A listener whose bind always fails, optionally after a delay.
#[derive(Default)]
pub struct FailingListener {
    pub delay: Duration,
}

#[async_trait]
impl Listener for FailingListener {
    async fn bind(&self, port: u16) -> Result<ListenerHandle, OperationError> {
        tokio::time::sleep(self.delay).await;
        Err(OperationError::Bind {
            address: format!("stub:{port}"),
            reason: "address in use".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Binds through `inner` after a delay and remembers the handle it returned.
pub struct DelayedListener {
    pub delay: Duration,
    pub inner: Arc<dyn Listener>,
    pub bound: Arc<Mutex<Option<ListenerHandle>>>,
}

impl DelayedListener {
    pub fn new(delay: Duration, inner: Arc<dyn Listener>) -> Self {
        Self {
            delay,
            inner,
            bound: Arc::new(Mutex::new(None)),
        }
    }

    pub fn bound(&self) -> Option<ListenerHandle> {
        self.bound.lock().unwrap().clone()
    }
}

#[async_trait]
impl Listener for DelayedListener {
    async fn bind(&self, port: u16) -> Result<ListenerHandle, OperationError> {
        tokio::time::sleep(self.delay).await;
        let handle = self.inner.bind(port).await?;
        *self.bound.lock().unwrap() = Some(handle.clone());
        Ok(handle)
    }

    fn name(&self) -> &'static str {
        "delayed"
    }
}

/// A message source that refuses every subscription.
pub struct FailingSource;

#[async_trait]
impl MessageSource for FailingSource {
    async fn subscribe(&self, topic: &str) -> Result<SubscriptionHandle, OperationError> {
        Err(OperationError::Subscribe {
            topic: topic.to_string(),
            reason: "broker unavailable".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Storage that records what it is asked to do instead of doing it.
///
/// Every statement lands in the journal. Statements whose SQL contains
/// `fail_on` are rejected, and `refuse_connections` makes acquisition fail.
#[derive(Clone, Default)]
pub struct ScriptedStorage {
    pub fail_on: Option<&'static str>,
    pub refuse_connections: bool,
    pub acquired: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub journal: Arc<Mutex<Vec<Statement>>>,
}

impl ScriptedStorage {
    pub fn failing_on(needle: &'static str) -> Self {
        Self {
            fail_on: Some(needle),
            ..Self::default()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// SQL of every statement seen so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .map(|statement| statement.sql().to_string())
            .collect()
    }

    fn run(&self, statement: Statement) -> Result<(), OperationError> {
        let rejected = self
            .fail_on
            .is_some_and(|needle| statement.sql().contains(needle));
        let sql = statement.sql().to_string();
        self.journal.lock().unwrap().push(statement);
        if rejected {
            return Err(OperationError::statement(&sql, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for ScriptedStorage {
    async fn acquire_connection(&self) -> Result<ConnectionHandle, OperationError> {
        if self.refuse_connections {
            return Err(OperationError::Connect {
                reason: "scripted refusal".to_string(),
            });
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedConnection {
            storage: self.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedConnection {
    storage: ScriptedStorage,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn execute(&self, statement: Statement) -> Result<(), OperationError> {
        self.storage.run(statement)
    }

    async fn query(&self, statement: Statement) -> Result<RowSet, OperationError> {
        let sql = statement.sql().to_string();
        self.storage
            .run(statement)
            .map(|_| RowSet::default())
            .map_err(|_| OperationError::query(&sql, "scripted failure"))
    }

    fn close(&self) {
        self.storage.closed.fetch_add(1, Ordering::SeqCst);
    }
}
