//! `/api/data`: whole-state read and replace over JSON.
//!
//! ```text
//! GET  /api/data  -> 200 {children, statuses}
//!                  | 500 {children: [], statuses: <defaults>, error}
//! POST /api/data  <- {children: [...], statuses: [...]}
//!                 -> 200 {message} | 400 {error} | 500 {error}
//! ```
//!
//! Any other method on the route gets `405` with an `Allow` header from the
//! method router.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tzaharon_core::{reassign_orphans, AppState, StatusRegistry};
use tzaharon_store::{StateStore, StoreError};

pub const DATA_PATH: &str = "/api/data";

pub const SAVED_MESSAGE: &str = "Data saved successfully";
pub const SAVE_FAILED: &str = "Failed to save data";
pub const FETCH_FAILED: &str = "Failed to fetch data";

#[derive(Clone)]
struct ApiState {
    store: Arc<dyn StateStore>,
}

pub fn build_router(store: Arc<dyn StateStore>) -> Router {
    Router::new()
        .route(DATA_PATH, get(get_data).post(post_data))
        .with_state(ApiState { store })
}

/// Why a `POST` body was rejected. The display text is sent to the client.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Request body is missing")]
    Missing,
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Invalid data format: `{0}` must be an array")]
    NotArray(&'static str),
    #[error("Invalid data format: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Validate a `POST` body: both `children` and `statuses` must be arrays.
pub fn parse_payload(body: &[u8]) -> Result<AppState, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::Missing);
    }
    let value: Value = serde_json::from_slice(body).map_err(PayloadError::InvalidJson)?;
    if value.is_null() {
        return Err(PayloadError::Missing);
    }
    for field in ["children", "statuses"] {
        if !value.get(field).is_some_and(Value::is_array) {
            return Err(PayloadError::NotArray(field));
        }
    }
    serde_json::from_value(value).map_err(PayloadError::Shape)
}

/// Read the record, seeding the default statuses when it is missing or has
/// none. Seeded state is written back; a failed write-back only logs.
pub async fn load_or_seed(store: &dyn StateStore) -> Result<AppState, StoreError> {
    let Some(mut state) = store.load().await? else {
        tracing::info!(store = %store.describe(), "no stored data, seeding defaults");
        let seeded = AppState::seeded();
        write_back(store, &seeded).await;
        return Ok(seeded);
    };

    if state.needs_seeding() {
        state.statuses = StatusRegistry::defaults();
        state.children = reassign_orphans(&state.children, &state.statuses);
        tracing::info!(
            children = state.children.len(),
            "stored registry empty, seeding default statuses"
        );
        write_back(store, &state).await;
        return Ok(state);
    }

    if state.migrate_absent_marker() {
        tracing::info!("marked legacy absent status by label");
        write_back(store, &state).await;
    }
    let dangling = state.dangling_children().count();
    if dangling > 0 {
        tracing::warn!(dangling, "children reference unknown statuses");
    }
    Ok(state)
}

async fn write_back(store: &dyn StateStore, state: &AppState) {
    if let Err(err) = store.save(state).await {
        tracing::warn!(error = %err, "failed to write upgraded data back");
    }
}

async fn get_data(State(api): State<ApiState>) -> Response {
    match load_or_seed(api.store.as_ref()).await {
        Ok(state) => ([(header::CACHE_CONTROL, "no-store")], Json(state)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, store = %api.store.describe(), "failed to fetch data");
            let body = json!({
                "children": [],
                "statuses": StatusRegistry::defaults(),
                "error": FETCH_FAILED,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

async fn post_data(State(api): State<ApiState>, body: Bytes) -> Response {
    let state = match parse_payload(&body) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "rejected payload");
            let body = json!({ "error": err.to_string() });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let dangling = state.dangling_children().count();
    if dangling > 0 {
        tracing::warn!(dangling, "saving children that reference unknown statuses");
    }

    match api.store.save(&state).await {
        Ok(()) => {
            tracing::info!(
                children = state.children.len(),
                statuses = state.statuses.len(),
                "data saved"
            );
            Json(json!({ "message": SAVED_MESSAGE })).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, store = %api.store.describe(), "failed to save data");
            let body = json!({ "error": SAVE_FAILED });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
