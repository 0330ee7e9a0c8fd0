// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use taxi_fleet_api::error_mapping::map_error;
use taxi_fleet_api::{ApiError, RedirectDto};
use taxi_fleet_model::ValidationErrors;
use taxi_fleet_store::{FleetStore, StoreError};
use tokio::time::timeout;
use tracing::{debug, warn};

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status =
        StatusCode::from_u16(map_error(&err).status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Json(json!({"error": err}));
    let mut resp = (status, body).into_response();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        resp.headers_mut()
            .insert("retry-after", HeaderValue::from_static("3"));
    }
    resp
}

/// Handler error; the tracing middleware stamps the request id into the body.
#[derive(Debug)]
pub(crate) struct HttpError(pub ApiError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = api_error_response(self.0.clone());
        response.extensions_mut().insert(self.0);
        response
    }
}

impl From<ApiError> for HttpError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl From<StoreError> for HttpError {
    fn from(value: StoreError) -> Self {
        Self(value.into())
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(value: ValidationErrors) -> Self {
        Self(value.into())
    }
}

pub(crate) type HandlerResult = Result<Response, HttpError>;

pub(crate) fn json_view<T: Serialize>(value: &T) -> Response {
    Json(value).into_response()
}

/// `303 See Other` to `path`, with the target echoed in the body.
pub(crate) fn see_other(path: &str) -> Response {
    let mut response = (
        StatusCode::SEE_OTHER,
        Json(RedirectDto {
            redirect: path.to_string(),
        }),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(path) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

pub(crate) fn with_set_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// The page the form was opened from, as forms offer a way back to it.
pub(crate) fn previous_page(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("/")
        .to_string()
}

/// Runs one read-only store call on the blocking pool, bounded by the
/// configured timeout.
pub(crate) async fn run_store<T, F>(
    state: &AppState,
    operation: &'static str,
    f: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&FleetStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let started = Instant::now();
    let joined = timeout(
        state.api.store_timeout,
        tokio::task::spawn_blocking(move || f(&store)),
    )
    .await;
    match joined {
        Err(_) => {
            warn!(operation, elapsed_ms = elapsed_ms(started), "store call timed out");
            Err(ApiError::timeout(operation))
        }
        Ok(joined) => finish_store_call(operation, started, joined),
    }
}

/// Runs one mutating store call on the blocking pool and waits for it to
/// finish. No timeout applies: an abandoned blocking task would still commit,
/// so the answer must wait for the outcome.
pub(crate) async fn run_store_write<T, F>(
    state: &AppState,
    operation: &'static str,
    f: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&FleetStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let started = Instant::now();
    let joined = tokio::task::spawn_blocking(move || f(&store)).await;
    finish_store_call(operation, started, joined)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn finish_store_call<T>(
    operation: &'static str,
    started: Instant,
    joined: Result<Result<T, StoreError>, tokio::task::JoinError>,
) -> Result<T, ApiError> {
    match joined {
        Err(join_err) => Err(ApiError::internal(format!(
            "store task failed: {join_err}"
        ))),
        Ok(result) => {
            debug!(
                operation,
                elapsed_ms = elapsed_ms(started),
                ok = result.is_ok(),
                "store call finished"
            );
            result.map_err(ApiError::from)
        }
    }
}
