//! HTTP adapter for the PayPal commands.
//!
//! - `POST /api/paypal/create-order` - One-time checkout order
//! - `POST /api/paypal/capture-order` - Capture an approved order
//! - `POST /api/paypal/create-subscription` - Start a subscription for approval
//! - `GET /api/paypal/subscription/:id` - Subscription as PayPal sees it
//! - `POST /api/paypal/cancel-subscription` - Cancel and unlink

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::paypal_routes;
