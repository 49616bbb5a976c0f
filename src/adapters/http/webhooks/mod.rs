//! HTTP adapter for processor webhooks.
//!
//! - `POST /api/stripe/webhook` - Stripe-Signature verified locally
//! - `POST /api/paypal/webhook` - verified through PayPal's API

pub mod handlers;
pub mod routes;

pub use routes::webhook_routes;
