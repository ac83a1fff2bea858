use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("the service rejected the request: {0}")]
    InvalidRequest(String),

    #[error("the model's current state forbids this operation: {0}")]
    Conflict(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("unexpected response from the service: {0}")]
    Protocol(String),

    #[error("invalid client state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gave up after waiting {0:?} for the service")]
    Timeout(Duration),

    #[error("operation cancelled")]
    Cancelled,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Map a non-success HTTP status to the matching error variant.
///
/// Used by every single-shot operation; polling loops classify their own
/// terminal codes instead (see `AccountClient::probe_deleted`).
pub(crate) fn classify_status(status: u16, detail: &str) -> ClientError {
    let detail = if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        detail.to_string()
    };
    match status {
        400 => ClientError::InvalidRequest(detail),
        401 => ClientError::Authentication("the credentials are invalid".to_string()),
        409 => ClientError::Conflict(detail),
        500..=599 => ClientError::Service(detail),
        other => ClientError::Protocol(format!("unexpected HTTP {other}: {detail}")),
    }
}
