// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::observability::messages::{http::RequestFailed, StructuredLog};
use crate::service::operations::recent_operations;
use crate::service::quotes::QuoteBook;
use crate::traits::StorageBackend;

#[derive(Clone)]
struct ApiState {
    quotes: QuoteBook,
    storage: Arc<dyn StorageBackend>,
}

#[derive(Debug, Deserialize)]
struct QuoteQuery {
    name: Option<String>,
}

/// Routes of the HTTP surface.
///
/// - `GET /quotes` every current quote, keyed by name
/// - `GET /quotes?name=X` one quote, or 404 with an empty body
/// - `GET /operations` the most recent stored records, newest first
pub fn router(quotes: QuoteBook, storage: Arc<dyn StorageBackend>) -> Router {
    Router::new()
        .route("/quotes", get(get_quotes))
        .route("/operations", get(get_operations))
        .with_state(ApiState { quotes, storage })
}

/// A bodiless response that still announces JSON, like every other route.
fn empty_json(status: StatusCode) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")]).into_response()
}

async fn get_quotes(State(state): State<ApiState>, Query(query): Query<QuoteQuery>) -> Response {
    let Some(name) = query.name else {
        return Json(state.quotes.snapshot()).into_response();
    };

    match state.quotes.get(&name) {
        Some(quote) => Json(quote.to_json()).into_response(),
        None => empty_json(StatusCode::NOT_FOUND),
    }
}

async fn get_operations(State(state): State<ApiState>) -> Response {
    match recent_operations(&state.storage).wait().await {
        Ok(records) => Json(records).into_response(),
        Err(err) => {
            RequestFailed {
                route: "/operations",
                error: &err,
            }
            .log();
            empty_json(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
