use serde::Deserialize;
use thiserror::Error;

/// Failure taxonomy for backend calls.
///
/// Nothing here is fatal: every variant is caught at the command layer and
/// rendered as a message. `SessionExpired` is the only error with a side
/// effect behind it - by the time a caller sees it, the persisted session
/// has already been cleared.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Login or register rejected by the backend. The message is the
    /// backend's own, or a fixed fallback when none was provided.
    #[error("{0}")]
    Credential(String),

    /// The backend answered 401. The persisted session record is cleared
    /// before this is returned.
    #[error("session expired")]
    SessionExpired,

    #[error("not found: {0}")]
    NotFound(String),

    /// Client-side input check failed; nothing was sent to the backend.
    #[error("{0}")]
    Validation(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Maximum length of a response body quoted in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 300;

/// Structured error payload the backend sends with non-2xx statuses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Map a drained error response to a variant. 401 is not handled here;
    /// the client deals with it before the body reaches this point.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = backend_message(body).unwrap_or_else(|| truncate_body(body));
        match status.as_u16() {
            404 => ApiError::NotFound(detail),
            500..=599 => ApiError::Server(detail),
            _ => ApiError::UnexpectedResponse(format!("status {}: {}", status.as_u16(), detail)),
        }
    }
}

/// Extract the backend's `{"message": ...}` from an error body, if present.
pub fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} total bytes)", &body[..end], body.len())
    }
}
