//! Data transfer objects for the Stripe billing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{
    CancelSubscriptionResult, CreateSetupIntentResult, CreateSubscriptionResult,
    SavePaymentMethodResult,
};

// ═══════════════════════════════════════════════════════════════════════════
// Request DTOs
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSetupIntentRequest {
    pub email: String,
    /// Plan hint from the pricing page; informational only.
    pub plan: Option<String>,
    pub price_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePaymentMethodRequest {
    pub email: String,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub email: String,
    pub price_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionRequest {
    pub email: String,
    #[serde(default)]
    pub cancel_immediately: bool,
}

/// `?email=` on the GET endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Response DTOs
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntentResponse {
    pub client_secret: String,
    pub customer_id: String,
}

impl From<CreateSetupIntentResult> for SetupIntentResponse {
    fn from(result: CreateSetupIntentResult) -> Self {
        Self {
            client_secret: result.client_secret,
            customer_id: result.customer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePaymentMethodResponse {
    pub success: bool,
    pub payment_method_id: String,
    pub card_last4: Option<String>,
}

impl From<SavePaymentMethodResult> for SavePaymentMethodResponse {
    fn from(result: SavePaymentMethodResult) -> Self {
        Self {
            success: true,
            payment_method_id: result.payment_method_id,
            card_last4: result.card_last4,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreatedResponse {
    pub subscription_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl From<CreateSubscriptionResult> for SubscriptionCreatedResponse {
    fn from(result: CreateSubscriptionResult) -> Self {
        Self {
            subscription_id: result.subscription_id,
            status: result.status,
            client_secret: result.client_secret,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionResponse {
    pub success: bool,
    pub subscription_id: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub current_period_end: Option<i64>,
}

impl From<CancelSubscriptionResult> for CancelSubscriptionResponse {
    fn from(result: CancelSubscriptionResult) -> Self {
        Self {
            success: true,
            subscription_id: result.subscription_id,
            status: result.status,
            cancel_at_period_end: result.cancel_at_period_end,
            canceled_at: result.canceled_at,
            current_period_end: result.current_period_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_request_defaults_to_period_end() {
        let req: CancelSubscriptionRequest =
            serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(!req.cancel_immediately);
    }

    #[test]
    fn requests_use_camel_case_fields() {
        let req: SavePaymentMethodRequest =
            serde_json::from_str(r#"{"email":"a@x.com","paymentMethodId":"pm_1"}"#).unwrap();
        assert_eq!(req.payment_method_id, "pm_1");
    }

    #[test]
    fn subscription_response_omits_missing_client_secret() {
        let json = serde_json::to_value(SubscriptionCreatedResponse {
            subscription_id: "sub_1".to_string(),
            status: "active".to_string(),
            client_secret: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"subscriptionId": "sub_1", "status": "active"}));
    }
}
