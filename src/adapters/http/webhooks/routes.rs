//! Axum router configuration for processor webhooks.

use axum::{routing::post, Router};

use super::super::state::AppState;
use super::handlers::{paypal_webhook, stripe_webhook};

/// Webhook routes, mounted at `/api`.
///
/// Kept apart from the JSON command routes: nothing may parse these bodies
/// before the handler sees them.
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/stripe/webhook", post(stripe_webhook))
        .route("/paypal/webhook", post(paypal_webhook))
}
