// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::OperationError;
use crate::traits::Message;

/// The latest record received for one name.
///
/// Only `name` is interpreted; every other field is kept verbatim and
/// serialized back next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Quote {
    /// Decode a bus message. It must be a JSON object with a string `name`.
    pub fn from_message(message: Message) -> Result<Self, OperationError> {
        serde_json::from_value(message).map_err(|err| OperationError::Decode {
            reason: err.to_string(),
        })
    }

    pub fn to_json(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(object)
    }
}

/// Current quotes keyed by name.
///
/// Written by the steady-state handler and read by the HTTP surface. The lock
/// is only ever held for a map operation, never across an await.
#[derive(Debug, Clone, Default)]
pub struct QuoteBook {
    quotes: Arc<RwLock<BTreeMap<String, Quote>>>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for the quote's name.
    pub fn record(&self, quote: Quote) {
        let mut quotes = self.quotes.write().unwrap_or_else(PoisonError::into_inner);
        quotes.insert(quote.name.clone(), quote);
    }

    pub fn get(&self, name: &str) -> Option<Quote> {
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        quotes.get(name).cloned()
    }

    /// Every known quote as one JSON object, name to record.
    pub fn snapshot(&self) -> Value {
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        Value::Object(
            quotes
                .iter()
                .map(|(name, quote)| (name.clone(), quote.to_json()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.quotes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
