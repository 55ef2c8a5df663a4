//! Error types for webhook delivery.

use thiserror::Error;

/// Error type for a single HTTP exchange.
///
/// Describes what went wrong without dictating recovery strategy; see
/// [`IsRetryable`](super::IsRetryable) for the retry classification.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed (DNS, refused, reset, TLS).
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not respond within the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built (bad URL, header or method).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Error from one delivery attempt.
#[derive(Debug, Error)]
pub enum RetryableError {
    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The endpoint answered with a non-2xx status.
    #[error("Endpoint returned {status}")]
    NonSuccessStatus {
        /// Response status.
        status: http::StatusCode,
        /// Response body, when it was valid UTF-8.
        body: Option<String>,
    },

    /// The body template failed to render.
    #[error("Template error: {0}")]
    Template(String),

    /// The default JSON body failed to serialize.
    #[error("Payload serialization failed: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Error returned by [`WebhookSender::send`](super::WebhookSender::send).
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Every attempt failed with a retryable error.
    #[error("Webhook failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        last_error: RetryableError,
    },

    /// An attempt failed in a way retrying cannot fix.
    #[error("Webhook rejected: {0}")]
    NonRetryable(#[from] RetryableError),
}
