//! StripeGateway port - the slice of Stripe's synchronous API the billing
//! commands use.
//!
//! Implementations must be explicitly constructed and injected; the HTTP
//! layer only ever sees `Arc<dyn StripeGateway>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{ChargeRecord, InvoiceRecord, PaymentIntentRecord};
use crate::domain::foundation::Timestamp;

use super::GatewayError;

#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_customer(&self, email: &str) -> Result<StripeCustomer, GatewayError>;

    /// Creates a setup intent for off-session use on the customer.
    async fn create_setup_intent(&self, customer_id: &str) -> Result<SetupIntent, GatewayError>;

    async fn retrieve_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, GatewayError>;

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<PaymentMethod, GatewayError>;

    /// Sets `invoice_settings.default_payment_method` on the customer.
    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<(), GatewayError>;

    /// Creates a subscription with `default_incomplete` payment behavior and
    /// the latest invoice's payment intent expanded.
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<StripeSubscription, GatewayError>;

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Cancels outright, or flags `cancel_at_period_end` when `at_period_end`.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<StripeSubscription, GatewayError>;

    async fn list_invoices(
        &self,
        customer_id: &str,
        since: Timestamp,
        limit: u32,
    ) -> Result<Vec<InvoiceRecord>, GatewayError>;

    async fn list_payment_intents(
        &self,
        customer_id: &str,
        since: Timestamp,
        limit: u32,
    ) -> Result<Vec<PaymentIntentRecord>, GatewayError>;

    async fn list_charges(
        &self,
        customer_id: &str,
        since: Timestamp,
        limit: u32,
    ) -> Result<Vec<ChargeRecord>, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    /// Customer the method is attached to, if any.
    pub customer: Option<String>,
    pub card_last4: Option<String>,
}

impl PaymentMethod {
    pub fn is_attached_to(&self, customer_id: &str) -> bool {
        self.customer.as_deref() == Some(customer_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscriptionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub default_payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    pub client_secret: Option<String>,
}

impl PaymentIntent {
    pub fn requires_confirmation(&self) -> bool {
        self.status == "requires_confirmation"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub current_period_end: Option<i64>,
    /// `latest_invoice.payment_intent`, when expanded.
    pub latest_payment_intent: Option<PaymentIntent>,
}
