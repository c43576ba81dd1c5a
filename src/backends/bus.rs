// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process publish/subscribe event bus.
//!
//! Each topic is a `tokio::sync::broadcast` channel: every subscriber sees
//! every message published after it subscribed. A subscriber that falls more
//! than `capacity` messages behind loses the oldest ones and is told how many
//! were skipped.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::errors::OperationError;
use crate::observability::messages::{bus::*, StructuredLog};
use crate::traits::{Message, MessageHandler, MessageSource, Subscription, SubscriptionHandle};

pub struct EventBus {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<Message>>>,
    closed: AtomicBool,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Publish to every current subscriber of `topic`; returns how many there were.
    pub fn publish(&self, topic: &str, message: Message) -> usize {
        // No receivers is not an error for a publisher.
        self.sender(topic).send(message).unwrap_or(0)
    }

    /// Refuse new subscriptions. Existing ones keep receiving.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<Message> {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[async_trait]
impl MessageSource for EventBus {
    async fn subscribe(&self, topic: &str) -> Result<SubscriptionHandle, OperationError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(OperationError::Subscribe {
                topic: topic.to_string(),
                reason: "event bus is closed".to_string(),
            });
        }

        let receiver = self.sender(topic).subscribe();
        Ok(Arc::new(BusSubscription {
            topic: topic.to_string(),
            receiver: Mutex::new(Some(receiver)),
            stop: CancellationToken::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "event_bus"
    }
}

struct BusSubscription {
    topic: String,
    receiver: Mutex<Option<broadcast::Receiver<Message>>>,
    stop: CancellationToken,
}

impl Subscription for BusSubscription {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn on_message(&self, mut handler: MessageHandler) -> Result<(), OperationError> {
        let mut receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| OperationError::Subscribe {
                topic: self.topic.clone(),
                reason: "a message handler is already registered".to_string(),
            })?;

        let topic = self.topic.clone();
        let stop = self.stop.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    received = receiver.recv() => match received {
                        Ok(message) => handler(message),
                        Err(RecvError::Lagged(skipped)) => {
                            SubscriberLagged { topic: &topic, skipped }.log();
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });
        Ok(())
    }

    fn unsubscribe(&self) {
        self.stop.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_messages_published_before_handler_are_delivered() {
        let bus = EventBus::new(8);
        let subscription = bus.subscribe("market").await.unwrap();
        assert_eq!(subscription.topic(), "market");

        assert_eq!(bus.publish("market", json!({"name": "ACME"})), 1);
        assert_eq!(bus.publish("other", json!({"name": "FOO"})), 0);

        let (sender, mut received) = mpsc::unbounded_channel();
        subscription
            .on_message(Box::new(move |message| {
                let _ = sender.send(message);
            }))
            .unwrap();

        bus.publish("market", json!({"name": "BAR"}));

        let first = tokio::time::timeout(Duration::from_secs(1), received.recv()).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), received.recv()).await.unwrap();
        assert_eq!(first, Some(json!({"name": "ACME"})));
        assert_eq!(second, Some(json!({"name": "BAR"})));
    }

    #[tokio::test]
    async fn test_only_one_handler_per_subscription() {
        let bus = EventBus::new(8);
        let subscription = bus.subscribe("market").await.unwrap();

        subscription.on_message(Box::new(|_| {})).unwrap();
        let error = subscription.on_message(Box::new(|_| {})).unwrap_err();

        assert!(matches!(error, OperationError::Subscribe { .. }));
        subscription.unsubscribe();
    }

    #[tokio::test]
    async fn test_closed_bus_refuses_subscriptions() {
        let bus = EventBus::new(8);
        bus.close();

        let error = bus.subscribe("market").await.err().unwrap();
        assert_eq!(
            error,
            OperationError::Subscribe {
                topic: "market".to_string(),
                reason: "event bus is closed".to_string(),
            }
        );
    }
}
