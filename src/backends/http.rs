// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::errors::OperationError;
use crate::observability::messages::{http::*, StructuredLog};
use crate::traits::{Listener, ListenerHandle};

/// Serves an axum router on a tokio TCP listener.
pub struct HttpListener {
    host: String,
    router: Router,
}

impl HttpListener {
    pub fn new(host: impl Into<String>, router: Router) -> Self {
        Self {
            host: host.into(),
            router,
        }
    }
}

#[async_trait]
impl Listener for HttpListener {
    async fn bind(&self, port: u16) -> Result<ListenerHandle, OperationError> {
        let address = format!("{}:{}", self.host, port);
        let bind_error = |err: std::io::Error| OperationError::Bind {
            address: address.clone(),
            reason: err.to_string(),
        };

        let listener = TcpListener::bind(&address).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let router = self.router.clone();
        tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await;
            ListenerStopped {
                address: local_addr,
                error: served.as_ref().err().map(|err| err as &dyn std::error::Error),
            }
            .log();
        });

        ListenerBound {
            address: local_addr,
        }
        .log();
        Ok(ListenerHandle::new(local_addr, shutdown))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
