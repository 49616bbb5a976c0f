//! Webhook rejection errors.
//!
//! Only the verification phase produces these. Once an event is verified the
//! endpoint always acknowledges it, so nothing past verification maps to a
//! non-2xx status.

use http::StatusCode;
use thiserror::Error;

/// Reasons a webhook request is rejected before dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The processor's webhook secret or client is not configured.
    #[error("{0}")]
    NotConfigured(&'static str),

    /// A required signature header is missing.
    #[error("{0}")]
    MissingHeaders(&'static str),

    /// The signature did not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The signed timestamp is older than the tolerance window.
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfRange,

    /// The signed timestamp is too far in the future.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Malformed signature header or event body.
    #[error("{0}")]
    ParseError(String),

    /// The processor's verification API answered with anything but SUCCESS.
    #[error("Webhook verification failed")]
    VerificationFailed,

    /// The verification API call itself failed.
    #[error("{0}")]
    VerificationError(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::MissingHeaders(_)
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::VerificationFailed
            | WebhookError::VerificationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Plain-text body returned to the processor.
    pub fn response_text(&self) -> String {
        match self {
            WebhookError::NotConfigured(msg) | WebhookError::MissingHeaders(msg) => {
                (*msg).to_string()
            }
            WebhookError::VerificationFailed => self.to_string(),
            other => format!("Webhook Error: {}", other),
        }
    }
}
