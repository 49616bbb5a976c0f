//! PayPalGateway port - PayPal REST operations used by the PayPal commands
//! and by webhook verification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::GatewayError;

#[async_trait]
pub trait PayPalGateway: Send + Sync {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<PayPalOrder, GatewayError>;

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder, GatewayError>;

    async fn create_subscription(
        &self,
        request: CreatePayPalSubscriptionRequest,
    ) -> Result<PayPalOrder, GatewayError>;

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<PayPalSubscription, GatewayError>;

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        reason: &str,
    ) -> Result<(), GatewayError>;

    /// Calls `/v1/notifications/verify-webhook-signature` and returns the
    /// raw `verification_status` (`SUCCESS` or `FAILURE`).
    async fn verify_webhook_signature(
        &self,
        request: VerifyWebhookSignature,
    ) -> Result<String, GatewayError>;
}

/// HATEOAS link as PayPal returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    /// Decimal string with two places, e.g. `"9.99"`.
    pub amount: String,
    pub currency: String,
    pub description: Option<String>,
    pub return_url: String,
    pub cancel_url: String,
}

/// An order or a pending subscription: both come back as id, status and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedOrder {
    pub id: String,
    pub status: String,
    pub payer_id: Option<String>,
    /// First capture's amount value, if any.
    pub amount: Option<String>,
}

impl CapturedOrder {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePayPalSubscriptionRequest {
    pub plan_id: String,
    pub subscriber_email: String,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPalSubscription {
    pub id: String,
    pub status: String,
    pub plan_id: Option<String>,
    pub start_time: Option<String>,
    pub next_billing_time: Option<String>,
}

/// Body of PayPal's signature verification call.
///
/// `webhook_event` is the delivery body exactly as received; PayPal checks
/// the signature against those bytes.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyWebhookSignature {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub webhook_id: String,
    pub webhook_event: Box<RawValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_completion_is_exact_status_match() {
        let order = |status: &str| CapturedOrder {
            id: "ORDER-1".to_string(),
            status: status.to_string(),
            payer_id: None,
            amount: None,
        };
        assert!(order("COMPLETED").is_completed());
        assert!(!order("PENDING").is_completed());
        assert!(!order("completed").is_completed());
    }

    #[test]
    fn verify_request_serializes_with_snake_case_fields() {
        let req = VerifyWebhookSignature {
            auth_algo: "SHA256withRSA".to_string(),
            cert_url: "https://api.paypal.com/cert".to_string(),
            transmission_id: "tx-1".to_string(),
            transmission_sig: "sig".to_string(),
            transmission_time: "2024-03-01T12:00:00Z".to_string(),
            webhook_id: "WH-1".to_string(),
            webhook_event: RawValue::from_string(r#"{"id": "WH-EVT-1"}"#.to_string()).unwrap(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["auth_algo"], "SHA256withRSA");
        assert_eq!(json["webhook_event"]["id"], "WH-EVT-1");
    }

    #[test]
    fn webhook_event_is_serialized_verbatim() {
        let body = r#"{"id":"WH-1","resource":{"payer_email":"a@x.com","id":"S-1"}}"#;
        let req = VerifyWebhookSignature {
            auth_algo: "SHA256withRSA".to_string(),
            cert_url: "https://api.paypal.com/cert".to_string(),
            transmission_id: "tx-1".to_string(),
            transmission_sig: "sig".to_string(),
            transmission_time: "2024-03-01T12:00:00Z".to_string(),
            webhook_id: "WH-1".to_string(),
            webhook_event: RawValue::from_string(body.to_string()).unwrap(),
        };
        let sent = serde_json::to_string(&req).unwrap();
        assert!(sent.contains(&format!(r#""webhook_event":{}"#, body)));
    }

    #[test]
    fn paypal_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PayPalGateway) {}
    }
}
