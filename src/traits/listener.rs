// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::Deferred;
use crate::errors::OperationError;

/// A bound, serving network listener.
///
/// Cloning shares the same shutdown signal.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
}

impl ListenerHandle {
    pub fn new(local_addr: SocketAddr, shutdown: CancellationToken) -> Self {
        Self {
            local_addr,
            shutdown,
        }
    }

    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and let in-flight requests finish.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[async_trait]
pub trait Listener: Send + Sync {
    /// Bind `port` and start serving.
    async fn bind(&self, port: u16) -> Result<ListenerHandle, OperationError>;

    fn name(&self) -> &'static str;
}

/// Leaf factory: bind `port` on `listener`.
pub fn bind(listener: &Arc<dyn Listener>, port: u16) -> Deferred<ListenerHandle> {
    let listener = Arc::clone(listener);
    Deferred::spawn(async move { listener.bind(port).await })
}
