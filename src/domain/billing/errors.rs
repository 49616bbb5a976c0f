//! Billing command errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | AccountNotFound | 404 |
//! | Precondition | 400 |
//! | ValidationFailed | 400 |
//! | CaptureIncomplete | 400 |
//! | NotConfigured | 503 |
//! | StorageUnavailable | 503 |
//! | Processor | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ValidationError};

use super::Processor;

/// Errors surfaced by the billing command API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// No account for the given email.
    AccountNotFound,

    /// The account lacks state an earlier command should have created.
    Precondition(String),

    ValidationFailed { field: String, message: String },

    /// A PayPal order was captured but did not complete.
    CaptureIncomplete { status: String },

    /// The processor's client is not wired.
    NotConfigured(Processor),

    /// The account store is unreachable; the caller should retry later.
    StorageUnavailable,

    /// The processor's API rejected or failed the call.
    Processor(String),

    Infrastructure(String),
}

impl BillingError {
    pub fn precondition(message: impl Into<String>) -> Self {
        BillingError::Precondition(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn processor(message: impl Into<String>) -> Self {
        BillingError::Processor(message.into())
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        match self {
            BillingError::AccountNotFound => "Account not found".to_string(),
            BillingError::Precondition(msg) => msg.clone(),
            BillingError::ValidationFailed { message, .. } => message.clone(),
            BillingError::CaptureIncomplete { .. } => "Order capture failed".to_string(),
            BillingError::NotConfigured(Processor::PayPal) => "PayPal is not configured".to_string(),
            BillingError::NotConfigured(Processor::Stripe) => "Stripe is not configured".to_string(),
            BillingError::StorageUnavailable => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            BillingError::Processor(msg) | BillingError::Infrastructure(msg) => msg.clone(),
        }
    }

    /// True for failures the caller did not cause.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            BillingError::Processor(_) | BillingError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        if err.is_unavailable() {
            BillingError::StorageUnavailable
        } else {
            BillingError::Infrastructure(err.message)
        }
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        BillingError::validation(err.field().to_string(), err.to_string())
    }
}
