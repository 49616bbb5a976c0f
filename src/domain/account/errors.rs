//! Registration and authentication errors.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | AlreadyExists | 409 |
//! | InvalidCredentials | 401 |
//! | StorageUnavailable | 503 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    ValidationFailed { field: String, message: String },
    AlreadyExists,
    InvalidCredentials,
    StorageUnavailable,
    Infrastructure(String),
}

impl AccountError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AccountError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        AccountError::Infrastructure(message.into())
    }

    pub fn message(&self) -> String {
        match self {
            AccountError::ValidationFailed { message, .. } => message.clone(),
            AccountError::AlreadyExists => "An account with this email already exists.".to_string(),
            AccountError::InvalidCredentials => "Invalid email or password".to_string(),
            AccountError::StorageUnavailable => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            AccountError::Infrastructure(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AccountError {}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        if err.is_unavailable() {
            AccountError::StorageUnavailable
        } else {
            AccountError::Infrastructure(err.message)
        }
    }
}

impl From<ValidationError> for AccountError {
    fn from(err: ValidationError) -> Self {
        AccountError::validation(err.field().to_string(), err.to_string())
    }
}
