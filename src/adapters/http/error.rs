//! Error responses for the JSON API.
//!
//! Every failed command answers `{"error": string}`, optionally with
//! `details` (validation) or `status` (incomplete PayPal capture).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::account::AccountError;
use crate::domain::billing::BillingError;

const INVALID_INPUT: &str = "Invalid input";
const INVALID_QUERY: &str = "Invalid query parameters";

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// PayPal order status when a capture did not complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            status: None,
        }
    }
}

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    pub fn invalid_input(details: impl Into<String>) -> Self {
        let mut body = ErrorResponse::new(INVALID_INPUT);
        body.details = Some(details.into());
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    pub fn invalid_query() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorResponse::new(INVALID_QUERY))
    }

    /// Maps a billing error for the command named by `action`.
    ///
    /// Processor and internal failures read `Failed to {action}: {message}`.
    pub fn billing(action: &'static str) -> impl Fn(BillingError) -> ApiError {
        move |err| ApiError::from_billing(action, err)
    }

    pub fn from_billing(action: &str, err: BillingError) -> Self {
        let status = match &err {
            BillingError::AccountNotFound => StatusCode::NOT_FOUND,
            BillingError::Precondition(_)
            | BillingError::ValidationFailed { .. }
            | BillingError::CaptureIncomplete { .. } => StatusCode::BAD_REQUEST,
            BillingError::NotConfigured(_) | BillingError::StorageUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            BillingError::Processor(_) | BillingError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match err {
            BillingError::ValidationFailed { message, .. } => {
                return Self::invalid_input(message);
            }
            BillingError::CaptureIncomplete { status } => ErrorResponse {
                error: "Order capture failed".to_string(),
                details: None,
                status: Some(status),
            },
            err if err.is_server_error() => {
                tracing::error!(action, error = %err, "Billing command failed");
                ErrorResponse::new(format!("Failed to {}: {}", action, err.message()))
            }
            err => ErrorResponse::new(err.message()),
        };
        Self::new(status, body)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let status = match &err {
            AccountError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            AccountError::AlreadyExists => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AccountError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match err {
            AccountError::ValidationFailed { message, .. } => Self::invalid_input(message),
            AccountError::Infrastructure(msg) => {
                tracing::error!(error = %msg, "Account command failed");
                Self::new(status, ErrorResponse::new("Internal server error"))
            }
            other => Self::new(status, ErrorResponse::new(other.message())),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(_: QueryRejection) -> Self {
        Self::invalid_query()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
