//! Errors returned by processor gateways.

use serde::{Deserialize, Serialize};

use crate::domain::billing::BillingError;

/// Failure of a call to a processor's API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// Processor-specific error code, e.g. Stripe's `resource_missing`.
    pub provider_code: Option<String>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for BillingError {
    fn from(err: GatewayError) -> Self {
        BillingError::Processor(err.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    NetworkError,
    AuthenticationError,
    CardDeclined,
    NotFound,
    RateLimitExceeded,
    InvalidRequest,
    InvalidResponse,
    ProviderError,
}

impl GatewayErrorCode {
    /// Classifies an HTTP status returned by a processor API.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => GatewayErrorCode::AuthenticationError,
            402 => GatewayErrorCode::CardDeclined,
            404 => GatewayErrorCode::NotFound,
            429 => GatewayErrorCode::RateLimitExceeded,
            400 | 409 | 422 => GatewayErrorCode::InvalidRequest,
            _ => GatewayErrorCode::ProviderError,
        }
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::CardDeclined => "card_declined",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(GatewayErrorCode::from_status(402), GatewayErrorCode::CardDeclined);
        assert_eq!(GatewayErrorCode::from_status(429), GatewayErrorCode::RateLimitExceeded);
        assert_eq!(GatewayErrorCode::from_status(503), GatewayErrorCode::ProviderError);
    }

    #[test]
    fn display_is_the_processor_message() {
        let err = GatewayError::provider("No such customer: 'cus_x'").with_provider_code("resource_missing");
        assert_eq!(err.to_string(), "No such customer: 'cus_x'");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn converts_to_processor_billing_error() {
        let err: BillingError = GatewayError::network("timed out").into();
        assert_eq!(err, BillingError::Processor("timed out".into()));
    }
}
