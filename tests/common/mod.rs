//! Shared fixtures for the HTTP integration tests.
//!
//! Builds the full router over in-memory stores and mock processor clients,
//! and keeps handles to them so tests can inspect what happened.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use priceguard::adapters::auth::Argon2PasswordHasher;
use priceguard::adapters::http::{router, AppState};
use priceguard::adapters::memory::{InMemoryAccountRepository, InMemoryWebhookEventRepository};
use priceguard::adapters::paypal::MockPayPalGateway;
use priceguard::adapters::stripe::MockStripeGateway;
use priceguard::domain::account::{Account, NewAccount};
use priceguard::domain::billing::{sign_payload, StripeWebhookVerifier};
use priceguard::domain::foundation::Email;

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const PAYPAL_WEBHOOK_ID: &str = "WH-INTEGRATION";
pub const FRONTEND_URL: &str = "https://app.priceguard.test";

// =============================================================================
// Test Infrastructure
// =============================================================================

pub struct TestApp {
    pub accounts: InMemoryAccountRepository,
    pub ledger: InMemoryWebhookEventRepository,
    pub stripe: MockStripeGateway,
    pub paypal: MockPayPalGateway,
    state: AppState,
}

impl TestApp {
    /// Both processors configured.
    pub fn new() -> Self {
        let accounts = InMemoryAccountRepository::new();
        let ledger = InMemoryWebhookEventRepository::new();
        let stripe = MockStripeGateway::new();
        let paypal = MockPayPalGateway::new();
        let state = AppState {
            accounts: Arc::new(accounts.clone()),
            webhook_events: Arc::new(ledger.clone()),
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            stripe: Some(Arc::new(stripe.clone())),
            stripe_webhook_verifier: Some(StripeWebhookVerifier::new(SecretString::new(
                WEBHOOK_SECRET.to_string(),
            ))),
            paypal: Some(Arc::new(paypal.clone())),
            paypal_webhook_id: Some(PAYPAL_WEBHOOK_ID.to_string()),
            frontend_url: FRONTEND_URL.to_string(),
        };
        Self {
            accounts,
            ledger,
            stripe,
            paypal,
            state,
        }
    }

    /// Stripe only: no PayPal client and no Stripe webhook secret.
    pub fn without_paypal_or_webhook_secret() -> Self {
        let mut app = Self::new();
        app.state.paypal = None;
        app.state.paypal_webhook_id = None;
        app.state.stripe_webhook_verifier = None;
        app
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn seed(&self, account: Account) {
        self.accounts.seed(account).await;
    }

    pub async fn stored(&self, email: &str) -> Account {
        self.accounts
            .all()
            .await
            .into_iter()
            .find(|a| a.email.as_str() == email)
            .expect("account should exist")
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_json(request).await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send_json(request).await
    }

    /// Posts a Stripe event signed with [`WEBHOOK_SECRET`] at the current time.
    pub async fn stripe_webhook(&self, payload: &str) -> (StatusCode, String) {
        let signature = sign_payload(
            WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
            payload.as_bytes(),
        );
        self.raw_webhook("/api/stripe/webhook", payload, &[("stripe-signature", &signature)])
            .await
    }

    /// Posts a PayPal event with a complete set of transmission headers.
    pub async fn paypal_webhook(&self, payload: &str) -> (StatusCode, String) {
        self.raw_webhook(
            "/api/paypal/webhook",
            payload,
            &[
                ("paypal-transmission-id", "tx-1"),
                ("paypal-transmission-time", "2026-03-01T00:00:00Z"),
                ("paypal-transmission-sig", "c2lnbmF0dXJl"),
                ("paypal-cert-url", "https://api.paypal.com/cert.pem"),
                ("paypal-auth-algo", "SHA256withRSA"),
            ],
        )
        .await
    }

    pub async fn raw_webhook(
        &self,
        uri: &str,
        payload: &str,
        headers: &[(&str, &str)],
    ) -> (StatusCode, String) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::from(payload.to_string())).unwrap();

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

/// An account as registration leaves it, with a throwaway hash.
pub fn account(email: &str) -> Account {
    Account::register(NewAccount {
        email: Email::new(email).unwrap(),
        password_hash: "unused".to_string(),
        plan: "pro".to_string(),
        card_last4: None,
        card_on_file: Default::default(),
    })
}

pub fn stripe_event(id: &str, event_type: &str, created: i64, object: Value) -> String {
    serde_json::json!({
        "id": id,
        "type": event_type,
        "created": created,
        "data": { "object": object },
    })
    .to_string()
}

pub fn paypal_event(id: &str, event_type: &str, resource: Value) -> String {
    serde_json::json!({
        "id": id,
        "event_type": event_type,
        "create_time": "2026-03-01T00:00:00Z",
        "resource": resource,
    })
    .to_string()
}
