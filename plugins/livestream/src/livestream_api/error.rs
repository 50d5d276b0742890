//! Error types surfaced by the Livestream API client.

use crate::livestream_api::queue::QueueClosed;
use http::StatusCode;

/// The HTTP exchange itself failed, before any status code was seen.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("send GET request to {url}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A Livestream API call did not produce a usable body.
///
/// A `404` is deliberately absent here: the client reports missing resources as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The account has exceeded its request budget (HTTP 403).
    ///
    /// Callers may treat this as a non-fatal outcome; the queue keeps draining at the
    /// configured interval either way.
    #[error("rate limiting error in Livestream API for {url}")]
    RateLimited { url: String, body: String },

    /// Any other non-200 response.
    #[error("unexpected status code {status} in Livestream API response for {url}")]
    UnexpectedStatus {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// A 200 response that claimed to be JSON but could not be parsed as the expected shape.
    #[error("invalid JSON in Livestream API response for {url} (status {status})")]
    InvalidJson {
        status: StatusCode,
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON response from {url}, got content-type {content_type:?}")]
    UnexpectedContentType {
        url: String,
        content_type: Option<String>,
        body: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("request queue dropped the request before it completed")]
    QueueClosed,
}

impl From<QueueClosed> for ApiError {
    fn from(_: QueueClosed) -> Self {
        ApiError::QueueClosed
    }
}

impl ApiError {
    /// Stable code reported alongside rate-limit failures.
    pub const RATE_LIMITED: &'static str = "RATE_LIMITED";

    /// A stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::RateLimited { .. } => Self::RATE_LIMITED,
            ApiError::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            ApiError::InvalidJson { .. } => "INVALID_JSON",
            ApiError::UnexpectedContentType { .. } => "UNEXPECTED_CONTENT_TYPE",
            ApiError::Transport(_) => "TRANSPORT_ERROR",
            ApiError::QueueClosed => "QUEUE_CLOSED",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// The HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::RateLimited { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::UnexpectedStatus { status, .. } | ApiError::InvalidJson { status, .. } => {
                Some(*status)
            }
            ApiError::UnexpectedContentType { .. }
            | ApiError::Transport(_)
            | ApiError::QueueClosed => None,
        }
    }

    /// The raw response body, kept for diagnostics.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ApiError::RateLimited { body, .. }
            | ApiError::UnexpectedStatus { body, .. }
            | ApiError::InvalidJson { body, .. }
            | ApiError::UnexpectedContentType { body, .. } => Some(body),
            ApiError::Transport(_) | ApiError::QueueClosed => None,
        }
    }
}
