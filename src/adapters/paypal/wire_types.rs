//! PayPal REST request and response shapes.

use serde::{Deserialize, Serialize};

use crate::ports::{CapturedOrder, Link, PayPalOrder, PayPalSubscription};

pub const BRAND_NAME: &str = "PriceGuard";

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// `{"name": "...", "message": "...", "debug_id": "..."}`
#[derive(Debug, Deserialize)]
pub struct PayPalErrorBody {
    pub name: Option<String>,
    pub message: Option<String>,
    pub debug_id: Option<String>,
    /// OAuth endpoint errors use this shape instead.
    pub error_description: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OrderBody {
    pub intent: &'static str,
    pub purchase_units: Vec<PurchaseUnit>,
    pub application_context: OrderContext,
}

#[derive(Debug, Serialize)]
pub struct PurchaseUnit {
    pub amount: Money,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct OrderContext {
    pub brand_name: &'static str,
    pub landing_page: &'static str,
    pub user_action: &'static str,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderWire {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl From<OrderWire> for PayPalOrder {
    fn from(wire: OrderWire) -> Self {
        PayPalOrder {
            id: wire.id,
            status: wire.status,
            links: wire.links,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CaptureWire {
    pub id: String,
    pub status: String,
    pub payer: Option<PayerWire>,
    #[serde(default)]
    pub purchase_units: Vec<CapturedUnitWire>,
}

#[derive(Debug, Deserialize)]
pub struct PayerWire {
    pub payer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CapturedUnitWire {
    pub payments: Option<PaymentsWire>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentsWire {
    #[serde(default)]
    pub captures: Vec<CaptureAmountWire>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureAmountWire {
    pub amount: Option<AmountWire>,
}

#[derive(Debug, Deserialize)]
pub struct AmountWire {
    pub value: String,
}

impl From<CaptureWire> for CapturedOrder {
    fn from(wire: CaptureWire) -> Self {
        let amount = wire
            .purchase_units
            .into_iter()
            .next()
            .and_then(|unit| unit.payments)
            .and_then(|payments| payments.captures.into_iter().next())
            .and_then(|capture| capture.amount)
            .map(|amount| amount.value);

        CapturedOrder {
            id: wire.id,
            status: wire.status,
            payer_id: wire.payer.and_then(|p| p.payer_id),
            amount,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subscriptions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubscriptionBody {
    pub plan_id: String,
    pub subscriber: SubscriberBody,
    pub application_context: SubscriptionContext,
}

#[derive(Debug, Serialize)]
pub struct SubscriberBody {
    pub email_address: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionContext {
    pub brand_name: &'static str,
    pub locale: &'static str,
    pub shipping_preference: &'static str,
    pub user_action: &'static str,
    pub payment_method: PaymentMethodPreference,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodPreference {
    pub payer_selected: &'static str,
    pub payee_preferred: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionWire {
    pub id: String,
    pub status: String,
    pub plan_id: Option<String>,
    pub start_time: Option<String>,
    pub billing_info: Option<BillingInfoWire>,
}

#[derive(Debug, Deserialize)]
pub struct BillingInfoWire {
    pub next_billing_time: Option<String>,
}

impl From<SubscriptionWire> for PayPalSubscription {
    fn from(wire: SubscriptionWire) -> Self {
        PayPalSubscription {
            id: wire.id,
            status: wire.status,
            plan_id: wire.plan_id,
            start_time: wire.start_time,
            next_billing_time: wire.billing_info.and_then(|b| b.next_billing_time),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelBody<'a> {
    pub reason: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VerificationWire {
    pub verification_status: String,
}
