// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Startup orchestration.
//!
//! Startup dispatches three independent operations at once (bind the HTTP
//! listener, subscribe to the quote topic, prepare the schema) and joins them.
//! Only when all three succeed is the steady-state message handler wired and
//! the service declared ready. The first failure observed decides a failed
//! startup; operations still in flight are left to finish on their own, and
//! a listener or subscription acquired after that point is released as soon
//! as it arrives.

use axum::Router;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::backends::{EventBus, HttpListener, SqliteStorage};
use crate::config::Config;
use crate::engine::{join3, Deferred};
use crate::errors::OperationError;
use crate::observability::messages::{bus::*, startup::*, storage::*, StructuredLog};
use crate::service::api;
use crate::service::operations::{initialize_database, store_operation};
use crate::service::quotes::{Quote, QuoteBook};
use crate::traits::{
    listener, source, Listener, ListenerHandle, MessageHandler, MessageSource, StorageBackend,
    SubscriptionHandle,
};

/// Where startup stands. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupState {
    Starting,
    Ready,
    Failed(OperationError),
}

/// Resources acquired by a successful startup, kept for the process lifetime.
#[derive(Clone)]
pub struct Services {
    pub listener: ListenerHandle,
    pub subscription: SubscriptionHandle,
}

impl Services {
    /// Stop message delivery and stop accepting requests.
    pub fn shutdown(&self) {
        self.subscription.unsubscribe();
        self.listener.shutdown();
    }
}

/// Startup parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupSettings {
    pub port: u16,
    pub topic: String,
    pub drop_on_start: bool,
}

impl From<&Config> for StartupSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            port: cfg.http.port,
            topic: cfg.bus.topic.clone(),
            drop_on_start: cfg.storage.drop_on_start,
        }
    }
}

pub struct Orchestrator {
    settings: StartupSettings,
    listener: Arc<dyn Listener>,
    source: Arc<dyn MessageSource>,
    storage: Arc<dyn StorageBackend>,
    quotes: QuoteBook,
    state: Arc<Mutex<StartupState>>,
    launched: AtomicBool,
}

/// Listener and subscription acquired while startup is undecided.
///
/// Once startup fails the set is abandoned: everything held is released, and
/// anything arriving later is released on arrival.
#[derive(Default)]
struct Acquired {
    abandoned: bool,
    listener: Option<ListenerHandle>,
    subscription: Option<SubscriptionHandle>,
}

type SharedAcquired = Arc<Mutex<Acquired>>;

fn keep_listener(acquired: &SharedAcquired, handle: ListenerHandle) -> ListenerHandle {
    let mut acquired = acquired.lock().unwrap_or_else(PoisonError::into_inner);
    if acquired.abandoned {
        handle.shutdown();
    } else {
        acquired.listener = Some(handle.clone());
    }
    handle
}

fn keep_subscription(acquired: &SharedAcquired, handle: SubscriptionHandle) -> SubscriptionHandle {
    let mut acquired = acquired.lock().unwrap_or_else(PoisonError::into_inner);
    if acquired.abandoned {
        handle.unsubscribe();
    } else {
        acquired.subscription = Some(Arc::clone(&handle));
    }
    handle
}

fn abandon(acquired: &SharedAcquired) {
    let mut acquired = acquired.lock().unwrap_or_else(PoisonError::into_inner);
    acquired.abandoned = true;
    if let Some(listener) = acquired.listener.take() {
        listener.shutdown();
    }
    if let Some(subscription) = acquired.subscription.take() {
        subscription.unsubscribe();
    }
}

impl Orchestrator {
    pub fn new(
        settings: StartupSettings,
        listener: Arc<dyn Listener>,
        source: Arc<dyn MessageSource>,
        storage: Arc<dyn StorageBackend>,
        quotes: QuoteBook,
    ) -> Self {
        Self {
            settings,
            listener,
            source,
            storage,
            quotes,
            state: Arc::new(Mutex::new(StartupState::Starting)),
            launched: AtomicBool::new(false),
        }
    }

    /// Wire the production backends: axum over HTTP, `bus` as the message
    /// source and SQLite at the configured path.
    pub fn from_config(cfg: &Config, bus: Arc<EventBus>) -> Self {
        let quotes = QuoteBook::new();
        let storage: Arc<dyn StorageBackend> = Arc::new(SqliteStorage::new(&cfg.storage.path));
        let router = api::router(quotes.clone(), Arc::clone(&storage));
        let listener = Arc::new(HttpListener::new(cfg.http.host.clone(), router));

        Self::new(StartupSettings::from(cfg), listener, bus, storage, quotes)
    }

    pub fn state(&self) -> StartupState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn quotes(&self) -> &QuoteBook {
        &self.quotes
    }

    /// The HTTP routes over this orchestrator's quotes and storage.
    pub fn router(&self) -> Router {
        api::router(self.quotes.clone(), Arc::clone(&self.storage))
    }

    /// Bring the service online.
    ///
    /// The returned result succeeds with the live [`Services`] once the
    /// listener is bound, the subscription is active, the schema exists and
    /// the steady-state handler is registered. Otherwise it fails with the
    /// first cause observed.
    ///
    /// An orchestrator starts once; later calls fail with
    /// [`OperationError::AlreadyStarted`] and leave the state untouched.
    pub fn start(&self) -> Deferred<Services> {
        if self.launched.swap(true, Ordering::SeqCst) {
            return Deferred::failed(OperationError::AlreadyStarted);
        }

        let settings = &self.settings;
        StartupStarted {
            port: settings.port,
            topic: &settings.topic,
            drop_on_start: settings.drop_on_start,
        }
        .log();

        let acquired = SharedAcquired::default();
        let keep = Arc::clone(&acquired);
        let bound = listener::bind(&self.listener, settings.port)
            .map(move |handle| keep_listener(&keep, handle));
        let keep = Arc::clone(&acquired);
        let subscribed = source::subscribe(&self.source, &settings.topic)
            .map(move |handle| keep_subscription(&keep, handle));
        let initialized = initialize_database(&self.storage, settings.drop_on_start);

        let handler = steady_state_handler(
            settings.topic.clone(),
            self.quotes.clone(),
            Arc::clone(&self.storage),
        );
        let wired = join3(&bound, &subscribed, &initialized).and_then(
            move |(listener, subscription, ())| {
                let services = Services {
                    listener,
                    subscription,
                };
                match services.subscription.on_message(handler) {
                    Ok(()) => Deferred::succeeded(services),
                    Err(cause) => {
                        services.shutdown();
                        Deferred::failed(cause)
                    }
                }
            },
        );

        let started = Deferred::new();
        let output = started.clone();
        let state = Arc::clone(&self.state);
        let topic = settings.topic.clone();
        wired.on_outcome(move |outcome| {
            let next = match &outcome {
                Ok(services) => {
                    StartupReady {
                        address: services.listener.local_addr(),
                        topic: &topic,
                    }
                    .log();
                    StartupState::Ready
                }
                Err(cause) => {
                    StartupFailed { error: cause }.log();
                    abandon(&acquired);
                    StartupState::Failed(cause.clone())
                }
            };
            *state.lock().unwrap_or_else(PoisonError::into_inner) = next;
            output.settle(outcome);
        });

        started
    }
}

/// Record every inbound quote and persist it, best effort.
fn steady_state_handler(
    topic: String,
    quotes: QuoteBook,
    storage: Arc<dyn StorageBackend>,
) -> MessageHandler {
    Box::new(move |message| {
        let quote = match Quote::from_message(message) {
            Ok(quote) => quote,
            Err(err) => {
                MessageDecodeFailed {
                    topic: &topic,
                    error: &err,
                }
                .log();
                return;
            }
        };

        let record = quote.to_json();
        let name = quote.name.clone();
        quotes.record(quote);

        store_operation(&storage, &record).on_outcome(move |outcome| {
            if let Err(err) = outcome {
                OperationStoreFailed {
                    name: &name,
                    error: &err,
                }
                .log();
            }
        });
    })
}
