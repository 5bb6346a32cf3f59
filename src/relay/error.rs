//! Relay error taxonomy and its mapping onto HTTP responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every way a relay call can fail. Each variant is terminal for the call.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound body is not a valid relay description.
    #[error("{0}")]
    Decode(serde_json::Error),

    /// Required field missing or empty.
    #[error("Method and URL are required")]
    Validation,

    /// Method, URL or a header was rejected while building the outbound request.
    #[error("{0}")]
    RequestConstruction(String),

    /// Upstream could not be reached or did not answer.
    #[error("{0}")]
    Execution(reqwest::Error),

    /// Upstream answered but its body could not be read to the end.
    #[error("{0}")]
    BodyRead(reqwest::Error),

    /// The summary could not be serialized.
    #[error("{0}")]
    Encoding(serde_json::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Decode(_) | RelayError::Validation => StatusCode::BAD_REQUEST,
            RelayError::RequestConstruction(_)
            | RelayError::Execution(_)
            | RelayError::BodyRead(_)
            | RelayError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stage label used in logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            RelayError::Decode(_) => "decode",
            RelayError::Validation => "validation",
            RelayError::RequestConstruction(_) => "construction",
            RelayError::Execution(_) => "execution",
            RelayError::BodyRead(_) => "body_read",
            RelayError::Encoding(_) => "encoding",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
