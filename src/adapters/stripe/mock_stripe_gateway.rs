//! Mock Stripe gateway for testing.
//!
//! Provides a configurable in-process implementation of [`StripeGateway`]
//! for unit and integration tests. Supports:
//! - Pre-registered payment methods and subscriptions
//! - Canned billing history
//! - Error injection, per method or for the next call
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::billing::{ChargeRecord, InvoiceRecord, PaymentIntentRecord};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    CreateSubscriptionRequest, GatewayError, GatewayErrorCode, PaymentIntent, PaymentMethod,
    SetupIntent, StripeCustomer, StripeGateway, StripeSubscription,
};

/// Mock Stripe gateway.
///
/// ```ignore
/// let stripe = MockStripeGateway::new();
/// stripe.add_payment_method("pm_card_visa", Some("4242"));
/// stripe.set_method_error("create_subscription", GatewayError::provider("boom"));
/// ```
#[derive(Default, Clone)]
pub struct MockStripeGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    payment_methods: HashMap<String, PaymentMethod>,
    subscriptions: HashMap<String, StripeSubscription>,

    /// Status of subscriptions created from now on; defaults to `active`.
    subscription_status: Option<String>,
    /// Payment intent attached to the next created subscription.
    next_payment_intent: Option<PaymentIntent>,
    /// Setup intents come back without a client secret when set.
    omit_client_secret: bool,

    invoices: Vec<InvoiceRecord>,
    payment_intents: Vec<PaymentIntentRecord>,
    charges: Vec<ChargeRecord>,

    next_error: Option<GatewayError>,
    method_errors: HashMap<String, GatewayError>,
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockStripeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════════

    /// Registers a detached card payment method.
    pub fn add_payment_method(&self, id: &str, card_last4: Option<&str>) {
        self.inner.lock().unwrap().payment_methods.insert(
            id.to_string(),
            PaymentMethod {
                id: id.to_string(),
                customer: None,
                card_last4: card_last4.map(str::to_string),
            },
        );
    }

    pub fn add_subscription(&self, subscription: StripeSubscription) {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    pub fn set_subscription_status(&self, status: &str) {
        self.inner.lock().unwrap().subscription_status = Some(status.to_string());
    }

    pub fn set_next_payment_intent(&self, payment_intent: PaymentIntent) {
        self.inner.lock().unwrap().next_payment_intent = Some(payment_intent);
    }

    pub fn omit_setup_intent_client_secret(&self) {
        self.inner.lock().unwrap().omit_client_secret = true;
    }

    pub fn set_history(
        &self,
        invoices: Vec<InvoiceRecord>,
        payment_intents: Vec<PaymentIntentRecord>,
        charges: Vec<ChargeRecord>,
    ) {
        let mut state = self.inner.lock().unwrap();
        state.invoices = invoices;
        state.payment_intents = payment_intents;
        state.charges = charges;
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Arguments of the last call to `method`.
    pub fn last_call(&self, method: &str) -> Option<Vec<String>> {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .rev()
            .find(|c| c.method == method)
            .map(|c| c.args.clone())
    }

    pub fn payment_method(&self, id: &str) -> Option<PaymentMethod> {
        self.inner.lock().unwrap().payment_methods.get(id).cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        format!("{}_mock_{}", prefix, state.next_id)
    }
}

fn not_found(kind: &str, id: &str) -> GatewayError {
    GatewayError::new(
        GatewayErrorCode::NotFound,
        format!("No such {}: '{}'", kind, id),
    )
    .with_provider_code("resource_missing")
}

#[async_trait]
impl StripeGateway for MockStripeGateway {
    async fn create_customer(&self, email: &str) -> Result<StripeCustomer, GatewayError> {
        self.record_call("create_customer", vec![email.to_string()]);
        self.check_error("create_customer")?;
        Ok(StripeCustomer {
            id: self.next_id("cus"),
        })
    }

    async fn create_setup_intent(&self, customer_id: &str) -> Result<SetupIntent, GatewayError> {
        self.record_call("create_setup_intent", vec![customer_id.to_string()]);
        self.check_error("create_setup_intent")?;
        let id = self.next_id("seti");
        let omit = self.inner.lock().unwrap().omit_client_secret;
        Ok(SetupIntent {
            client_secret: (!omit).then(|| format!("{}_secret_mock", id)),
            id,
        })
    }

    async fn retrieve_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<PaymentMethod, GatewayError> {
        self.record_call("retrieve_payment_method", vec![payment_method_id.to_string()]);
        self.check_error("retrieve_payment_method")?;
        self.payment_method(payment_method_id)
            .ok_or_else(|| not_found("payment_method", payment_method_id))
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<PaymentMethod, GatewayError> {
        self.record_call(
            "attach_payment_method",
            vec![payment_method_id.to_string(), customer_id.to_string()],
        );
        self.check_error("attach_payment_method")?;
        let mut state = self.inner.lock().unwrap();
        let pm = state
            .payment_methods
            .get_mut(payment_method_id)
            .ok_or_else(|| not_found("payment_method", payment_method_id))?;
        pm.customer = Some(customer_id.to_string());
        Ok(pm.clone())
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<(), GatewayError> {
        self.record_call(
            "set_default_payment_method",
            vec![customer_id.to_string(), payment_method_id.to_string()],
        );
        self.check_error("set_default_payment_method")
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<StripeSubscription, GatewayError> {
        self.record_call(
            "create_subscription",
            vec![
                request.customer_id.clone(),
                request.price_id.clone(),
                request.default_payment_method.clone(),
            ],
        );
        self.check_error("create_subscription")?;

        let id = self.next_id("sub");
        let mut state = self.inner.lock().unwrap();
        let subscription = StripeSubscription {
            id,
            status: state
                .subscription_status
                .clone()
                .unwrap_or_else(|| "active".to_string()),
            cancel_at_period_end: false,
            canceled_at: None,
            current_period_end: Some(Timestamp::now().plus_secs(30 * 24 * 60 * 60).unix()),
            latest_payment_intent: state.next_payment_intent.take(),
        };
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        self.record_call("confirm_payment_intent", vec![payment_intent_id.to_string()]);
        self.check_error("confirm_payment_intent")?;
        Ok(PaymentIntent {
            id: payment_intent_id.to_string(),
            status: "succeeded".to_string(),
            client_secret: None,
        })
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<StripeSubscription, GatewayError> {
        self.record_call(
            "cancel_subscription",
            vec![subscription_id.to_string(), at_period_end.to_string()],
        );
        self.check_error("cancel_subscription")?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| not_found("subscription", subscription_id))?;

        if at_period_end {
            subscription.cancel_at_period_end = true;
        } else {
            subscription.status = "canceled".to_string();
            subscription.canceled_at = Some(Timestamp::now().unix());
        }
        Ok(subscription.clone())
    }

    async fn list_invoices(
        &self,
        customer_id: &str,
        _since: Timestamp,
        limit: u32,
    ) -> Result<Vec<InvoiceRecord>, GatewayError> {
        self.record_call("list_invoices", vec![customer_id.to_string(), limit.to_string()]);
        self.check_error("list_invoices")?;
        Ok(self.inner.lock().unwrap().invoices.clone())
    }

    async fn list_payment_intents(
        &self,
        customer_id: &str,
        _since: Timestamp,
        limit: u32,
    ) -> Result<Vec<PaymentIntentRecord>, GatewayError> {
        self.record_call(
            "list_payment_intents",
            vec![customer_id.to_string(), limit.to_string()],
        );
        self.check_error("list_payment_intents")?;
        Ok(self.inner.lock().unwrap().payment_intents.clone())
    }

    async fn list_charges(
        &self,
        customer_id: &str,
        _since: Timestamp,
        limit: u32,
    ) -> Result<Vec<ChargeRecord>, GatewayError> {
        self.record_call("list_charges", vec![customer_id.to_string(), limit.to_string()]);
        self.check_error("list_charges")?;
        Ok(self.inner.lock().unwrap().charges.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn customers_get_distinct_ids() {
        let mock = MockStripeGateway::new();
        let a = mock.create_customer("a@x.com").await.unwrap();
        let b = mock.create_customer("b@x.com").await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(mock.call_count("create_customer"), 2);
    }

    #[tokio::test]
    async fn attach_links_payment_method_to_customer() {
        let mock = MockStripeGateway::new();
        mock.add_payment_method("pm_1", Some("4242"));

        let pm = mock.attach_payment_method("pm_1", "cus_1").await.unwrap();
        assert!(pm.is_attached_to("cus_1"));
        assert_eq!(mock.payment_method("pm_1").unwrap().customer.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn unknown_payment_method_is_not_found() {
        let mock = MockStripeGateway::new();
        let err = mock.retrieve_payment_method("pm_nope").await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NotFound);
    }

    #[tokio::test]
    async fn cancel_at_period_end_keeps_status() {
        let mock = MockStripeGateway::new();
        mock.add_subscription(StripeSubscription {
            id: "sub_1".into(),
            status: "active".into(),
            cancel_at_period_end: false,
            canceled_at: None,
            current_period_end: None,
            latest_payment_intent: None,
        });

        let sub = mock.cancel_subscription("sub_1", true).await.unwrap();
        assert_eq!(sub.status, "active");
        assert!(sub.cancel_at_period_end);

        let sub = mock.cancel_subscription("sub_1", false).await.unwrap();
        assert_eq!(sub.status, "canceled");
        assert!(sub.canceled_at.is_some());
    }

    #[tokio::test]
    async fn method_error_only_affects_that_method() {
        let mock = MockStripeGateway::new();
        mock.set_method_error("create_setup_intent", GatewayError::provider("boom"));

        assert!(mock.create_customer("a@x.com").await.is_ok());
        assert!(mock.create_setup_intent("cus_1").await.is_err());
    }

    #[tokio::test]
    async fn next_error_is_consumed_once() {
        let mock = MockStripeGateway::new();
        mock.set_error(GatewayError::network("timeout"));

        assert!(mock.create_customer("a@x.com").await.is_err());
        assert!(mock.create_customer("a@x.com").await.is_ok());
    }
}
