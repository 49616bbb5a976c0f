//! Axum router configuration for the PayPal endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{
    cancel_subscription, capture_order, create_order, create_subscription, get_subscription,
};

/// Routes mounted at `/api/paypal`.
///
/// Every route answers 503 when no PayPal client is configured. The webhook
/// lives in the webhooks router so it can keep its raw body.
pub fn paypal_routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/capture-order", post(capture_order))
        .route("/create-subscription", post(create_subscription))
        .route("/subscription/:id", get(get_subscription))
        .route("/cancel-subscription", post(cancel_subscription))
}
