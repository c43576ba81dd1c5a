// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::Deferred;
use crate::errors::OperationError;

/// Payload delivered by a message source.
pub type Message = serde_json::Value;

/// Steady-state callback, invoked once per inbound message.
pub type MessageHandler = Box<dyn FnMut(Message) + Send>;

/// A live subscription to one topic.
pub trait Subscription: Send + Sync {
    fn topic(&self) -> &str;

    /// Start delivering messages to `handler`.
    ///
    /// Only one handler may be registered per subscription; messages that
    /// arrived between subscribing and registering are delivered first.
    fn on_message(&self, handler: MessageHandler) -> Result<(), OperationError>;

    /// Stop delivery. Messages not yet handled are dropped.
    fn unsubscribe(&self);
}

pub type SubscriptionHandle = Arc<dyn Subscription>;

#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn subscribe(&self, topic: &str) -> Result<SubscriptionHandle, OperationError>;

    fn name(&self) -> &'static str;
}

/// Leaf factory: subscribe to `topic` on `source`.
pub fn subscribe(source: &Arc<dyn MessageSource>, topic: &str) -> Deferred<SubscriptionHandle> {
    let source = Arc::clone(source);
    let topic = topic.to_string();
    Deferred::spawn(async move { source.subscribe(&topic).await })
}
