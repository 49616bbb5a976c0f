//! Axum router configuration for the Stripe billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{
    billing_history, cancel_subscription, create_setup_intent, create_subscription,
    save_payment_method, subscription,
};

/// Routes mounted at `/api/billing`.
///
/// # Routes
/// - `POST /create-setup-intent`
/// - `POST /save-payment-method`
/// - `POST /create-subscription`
/// - `POST /cancel-subscription`
/// - `GET /billing-history?email=`
/// - `GET /subscription?email=`
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/create-setup-intent", post(create_setup_intent))
        .route("/save-payment-method", post(save_payment_method))
        .route("/create-subscription", post(create_subscription))
        .route("/cancel-subscription", post(cancel_subscription))
        .route("/billing-history", get(billing_history))
        .route("/subscription", get(subscription))
}
