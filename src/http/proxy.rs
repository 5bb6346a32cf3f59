//! `POST /proxy` handler.
//!
//! JSON summary on success, plain-text error description on failure.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::{RelayError, RelayRequest};

pub async fn relay_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(request_id = %request_id, body_bytes = body.len(), "Received relay request");

    let request = match RelayRequest::from_json(&body) {
        Ok(r) => r,
        Err(e) => return reject(e, &request_id, metrics::method_label(""), start),
    };
    let method = metrics::method_label(&request.method);

    match state.executor.relay(request).await {
        Ok(relayed) => {
            metrics::record_relay(method, "success", start);
            tracing::debug!(
                request_id = %request_id,
                relay_id = %relayed.summary.id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Relay complete"
            );
            ([(header::CONTENT_TYPE, "application/json")], relayed.json).into_response()
        }
        Err(e) => reject(e, &request_id, method, start),
    }
}

fn reject(err: RelayError, request_id: &str, method: &'static str, start: Instant) -> Response {
    let status = err.status_code();
    if status.is_client_error() {
        tracing::warn!(request_id = %request_id, stage = err.stage(), error = %err, "Relay rejected");
    } else {
        tracing::error!(request_id = %request_id, stage = err.stage(), error = %err, "Relay failed");
    }
    metrics::record_relay(method, err.stage(), start);
    err.into_response()
}
