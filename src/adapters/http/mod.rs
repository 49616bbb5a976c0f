//! HTTP adapters - REST API implementations.
//!
//! Each area has its own DTOs, handlers and routes. [`router`] assembles them
//! into the full API with state applied; middleware is added by the binary.

pub mod account;
pub mod billing;
pub mod error;
pub mod health;
pub mod paypal;
pub mod state;
pub mod webhooks;

use axum::Router;

use crate::domain::foundation::Email;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

/// The complete application router.
///
/// # Routes
/// - `/health`
/// - `/api/auth/*`
/// - `/api/billing/*`
/// - `/api/paypal/*`
/// - `/api/stripe/webhook`, `/api/paypal/webhook`
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", account::account_routes())
        .nest("/billing", billing::billing_routes())
        .nest("/paypal", paypal::paypal_routes())
        .merge(webhooks::webhook_routes());

    Router::new()
        .merge(health::health_routes())
        .nest("/api", api)
        .with_state(state)
}

/// Email from a JSON body; failures read "Invalid input".
fn body_email(raw: &str) -> Result<Email, ApiError> {
    Email::new(raw).map_err(|e| ApiError::invalid_input(e.to_string()))
}

/// Email from a query string; failures read "Invalid query parameters".
fn query_email(raw: &str) -> Result<Email, ApiError> {
    Email::new(raw).map_err(|_| ApiError::invalid_query())
}
