//! HTTP handlers for processor webhooks.
//!
//! Both routes take the untouched body as `Bytes`: the Stripe signature covers
//! the exact bytes, and PayPal's verification call echoes the event back.
//! Only a verification failure produces a non-200 response.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::application::handlers::webhooks::{
    HandlePayPalWebhookCommand, HandleStripeWebhookCommand, PayPalTransmission, WebhookOutcome,
};
use crate::domain::billing::{Processor, WebhookError};

use super::super::state::AppState;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn acknowledge(processor: Processor, outcome: WebhookOutcome) -> Response {
    tracing::debug!(%processor, ?outcome, "Webhook acknowledged");
    Json(json!({ "received": true })).into_response()
}

fn reject(err: WebhookError) -> Response {
    (err.status_code(), err.response_text()).into_response()
}

/// POST /api/stripe/webhook
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature: header(&headers, "stripe-signature"),
    };

    match state.stripe_webhook_handler().handle(cmd).await {
        Ok(outcome) => acknowledge(Processor::Stripe, outcome),
        Err(err) => reject(err),
    }
}

/// POST /api/paypal/webhook
pub async fn paypal_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let cmd = HandlePayPalWebhookCommand {
        payload: body.to_vec(),
        transmission: PayPalTransmission {
            transmission_id: header(&headers, "paypal-transmission-id"),
            transmission_time: header(&headers, "paypal-transmission-time"),
            transmission_sig: header(&headers, "paypal-transmission-sig"),
            cert_url: header(&headers, "paypal-cert-url"),
            auth_algo: header(&headers, "paypal-auth-algo"),
        },
    };

    match state.paypal_webhook_handler().handle(cmd).await {
        Ok(outcome) => acknowledge(Processor::PayPal, outcome),
        Err(err) => reject(err),
    }
}
