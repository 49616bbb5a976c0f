//! Data transfer objects for the PayPal endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::paypal::{
    CaptureOrderResult, CreateOrderResult, CreatePayPalSubscriptionResult,
};
use crate::ports::{Link, PayPalSubscription};

fn default_currency() -> String {
    "USD".to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// Request DTOs
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub email: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOrderRequest {
    pub email: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub email: String,
    /// PayPal billing plan id (`P-...`).
    pub plan_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelSubscriptionRequest {
    pub email: String,
    pub reason: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Response DTOs
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub status: String,
    pub links: Vec<Link>,
}

impl From<CreateOrderResult> for OrderResponse {
    fn from(result: CreateOrderResult) -> Self {
        Self {
            order_id: result.order_id,
            status: result.status,
            links: result.links,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub order_id: String,
    pub status: String,
    pub payer_id: Option<String>,
    pub amount: Option<String>,
}

impl From<CaptureOrderResult> for CaptureResponse {
    fn from(result: CaptureOrderResult) -> Self {
        Self {
            order_id: result.order_id,
            status: result.status,
            payer_id: result.payer_id,
            amount: result.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreatedResponse {
    pub subscription_id: String,
    pub status: String,
    pub links: Vec<Link>,
}

impl From<CreatePayPalSubscriptionResult> for SubscriptionCreatedResponse {
    fn from(result: CreatePayPalSubscriptionResult) -> Self {
        Self {
            subscription_id: result.subscription_id,
            status: result.status,
            links: result.links,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: String,
    pub status: String,
    pub plan_id: Option<String>,
    pub start_time: Option<String>,
    pub next_billing_time: Option<String>,
}

impl From<PayPalSubscription> for SubscriptionResponse {
    fn from(sub: PayPalSubscription) -> Self {
        Self {
            id: sub.id,
            status: sub.status,
            plan_id: sub.plan_id,
            start_time: sub.start_time,
            next_billing_time: sub.next_billing_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
