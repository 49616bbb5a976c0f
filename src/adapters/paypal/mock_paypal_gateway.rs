//! Mock PayPal gateway for testing.
//!
//! Supports canned capture results, subscription lookups, a switchable
//! webhook verification status, error injection and call tracking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    CapturedOrder, CreateOrderRequest, CreatePayPalSubscriptionRequest, GatewayError,
    GatewayErrorCode, Link, PayPalGateway, PayPalOrder, PayPalSubscription,
    VerifyWebhookSignature,
};

#[derive(Clone)]
pub struct MockPayPalGateway {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    next_id: u64,
    capture_status: String,
    payer_id: Option<String>,
    subscriptions: HashMap<String, PayPalSubscription>,
    verification_status: String,
    verify_requests: Vec<VerifyWebhookSignature>,
    method_errors: HashMap<String, GatewayError>,
    call_log: Vec<(String, Vec<String>)>,
}

impl Default for MockPayPalGateway {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                next_id: 0,
                capture_status: "COMPLETED".to_string(),
                payer_id: Some("PAYER-MOCK".to_string()),
                subscriptions: HashMap::new(),
                verification_status: "SUCCESS".to_string(),
                verify_requests: Vec::new(),
                method_errors: HashMap::new(),
                call_log: Vec::new(),
            })),
        }
    }
}

impl MockPayPalGateway {
    /// A gateway whose captures complete and whose webhooks verify.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that answers `FAILURE` to every webhook verification.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.set_verification_status("FAILURE");
        mock
    }

    pub fn set_verification_status(&self, status: &str) {
        self.inner.lock().unwrap().verification_status = status.to_string();
    }

    pub fn set_capture_result(&self, status: &str, payer_id: Option<&str>) {
        let mut state = self.inner.lock().unwrap();
        state.capture_status = status.to_string();
        state.payer_id = payer_id.map(str::to_string);
    }

    pub fn add_subscription(&self, subscription: PayPalSubscription) {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn last_call(&self, method: &str) -> Option<Vec<String>> {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, args)| args.clone())
    }

    /// Verification requests received, in order.
    pub fn verify_requests(&self) -> Vec<VerifyWebhookSignature> {
        self.inner.lock().unwrap().verify_requests.clone()
    }

    fn record_call(&self, method: &str, args: Vec<String>) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push((method.to_string(), args));
        match state.method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        format!("{}-MOCK-{}", prefix, state.next_id)
    }
}

fn approve_link(id: &str) -> Vec<Link> {
    vec![Link {
        href: format!("https://www.sandbox.paypal.com/checkoutnow?token={}", id),
        rel: "approve".to_string(),
        method: Some("GET".to_string()),
    }]
}

#[async_trait]
impl PayPalGateway for MockPayPalGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<PayPalOrder, GatewayError> {
        self.record_call(
            "create_order",
            vec![request.amount.clone(), request.currency.clone()],
        )?;
        let id = self.next_id("ORDER");
        Ok(PayPalOrder {
            links: approve_link(&id),
            id,
            status: "CREATED".to_string(),
        })
    }

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder, GatewayError> {
        self.record_call("capture_order", vec![order_id.to_string()])?;
        let state = self.inner.lock().unwrap();
        Ok(CapturedOrder {
            id: order_id.to_string(),
            status: state.capture_status.clone(),
            payer_id: state.payer_id.clone(),
            amount: Some("9.99".to_string()),
        })
    }

    async fn create_subscription(
        &self,
        request: CreatePayPalSubscriptionRequest,
    ) -> Result<PayPalOrder, GatewayError> {
        self.record_call(
            "create_subscription",
            vec![request.plan_id.clone(), request.subscriber_email.clone()],
        )?;
        let id = self.next_id("I");
        self.add_subscription(PayPalSubscription {
            id: id.clone(),
            status: "APPROVAL_PENDING".to_string(),
            plan_id: Some(request.plan_id),
            start_time: None,
            next_billing_time: None,
        });
        Ok(PayPalOrder {
            links: approve_link(&id),
            id,
            status: "APPROVAL_PENDING".to_string(),
        })
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<PayPalSubscription, GatewayError> {
        self.record_call("get_subscription", vec![subscription_id.to_string()])?;
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| {
                GatewayError::new(
                    GatewayErrorCode::NotFound,
                    "The specified resource does not exist.",
                )
            })
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        reason: &str,
    ) -> Result<(), GatewayError> {
        self.record_call(
            "cancel_subscription",
            vec![subscription_id.to_string(), reason.to_string()],
        )?;
        if let Some(sub) = self.inner.lock().unwrap().subscriptions.get_mut(subscription_id) {
            sub.status = "CANCELLED".to_string();
        }
        Ok(())
    }

    async fn verify_webhook_signature(
        &self,
        request: VerifyWebhookSignature,
    ) -> Result<String, GatewayError> {
        self.record_call(
            "verify_webhook_signature",
            vec![request.transmission_id.clone()],
        )?;
        let mut state = self.inner.lock().unwrap();
        state.verify_requests.push(request);
        Ok(state.verification_status.clone())
    }
}
