//! Webhook errors.

use thiserror::Error;

/// Errors raised while verifying or decoding a webhook.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The signature header is missing a timestamp or a `v1` signature.
    #[error("malformed signature header")]
    MalformedHeader,

    /// The signed timestamp is outside the accepted tolerance.
    #[error("timestamp outside tolerance")]
    TimestampOutOfTolerance,

    /// No `v1` signature matches the payload.
    #[error("no matching signature")]
    SignatureMismatch,

    /// The payload is not a valid event.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The event lacks a field its handler needs.
    #[error("event {event_type} is missing {field}")]
    MissingField {
        /// Event type.
        event_type: String,
        /// Missing field.
        field: &'static str,
    },
}
