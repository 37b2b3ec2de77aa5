//! HTTP handlers for the fortune resource
//!
//! Thin adapters: extract the conditional headers and path id, call the
//! verb handler, render the outcome. Identifier and body validation are
//! boundary concerns handled by the extractors (400 on a malformed UUID or
//! body).

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use http::Method;
use uuid::Uuid;

use revision_service::http as boundary;

use crate::model::Fortune;
use crate::AppState;

/// Health check endpoint
///
/// Returns "ok" if the service is running.
pub async fn health() -> &'static str {
    "ok"
}

/// GET /fortune/v1/{id}
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let id = id.to_string();
    let tag = boundary::if_none_match_header(&headers);
    let outcome = state.fortunes.get(&id, tag.as_ref()).await;
    boundary::render(&Method::GET, Some(id.as_str()), outcome, state.fortunes.policy())
}

/// HEAD /fortune/v1/{id} - same decision as GET, no body
pub async fn head(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let id = id.to_string();
    let tag = boundary::if_none_match_header(&headers);
    let outcome = state.fortunes.head(&id, tag.as_ref()).await;
    boundary::render(&Method::HEAD, Some(id.as_str()), outcome, state.fortunes.policy())
}

/// PUT /fortune/v1/{id} - upsert, conditional when `If-Match` is supplied
pub async fn upsert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(fortune): Json<Fortune>,
) -> Response {
    let id = id.to_string();
    let tag = boundary::if_match_header(&headers);
    let outcome = state.fortunes.put(&id, fortune, tag.as_ref()).await;
    boundary::render(&Method::PUT, Some(id.as_str()), outcome, state.fortunes.policy())
}

/// POST /fortune/v1 - create at a server-generated id
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(fortune): Json<Fortune>,
) -> Response {
    let tag = boundary::if_match_header(&headers);
    let outcome = state.fortunes.post(fortune, tag.as_ref()).await;
    boundary::render(&Method::POST, None, outcome, state.fortunes.policy())
}

/// DELETE /fortune/v1/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let id = id.to_string();
    let tag = boundary::if_match_header(&headers);
    let outcome = state.fortunes.delete(&id, tag.as_ref()).await;
    boundary::render(&Method::DELETE, Some(id.as_str()), outcome, state.fortunes.policy())
}

/// PATCH /fortune/v1/{id} - pass-through, intentionally unimplemented
pub async fn patch(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let id = id.to_string();
    boundary::render(
        &Method::PATCH,
        Some(id.as_str()),
        state.fortunes.patch(),
        state.fortunes.policy(),
    )
}

/// OPTIONS - advertise the allowed method set
pub async fn options(State(state): State<AppState>) -> Response {
    boundary::render_options(state.fortunes.policy())
}
