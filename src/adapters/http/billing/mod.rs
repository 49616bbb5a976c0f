//! HTTP adapter for the Stripe billing commands.
//!
//! - `POST /api/billing/create-setup-intent` - Start saving a card
//! - `POST /api/billing/save-payment-method` - Make a confirmed card the default
//! - `POST /api/billing/create-subscription` - Subscribe to a price
//! - `POST /api/billing/cancel-subscription` - Cancel now or at period end
//! - `GET /api/billing/billing-history` - Trailing-year transactions
//! - `GET /api/billing/subscription` - Locally mirrored billing state

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::billing_routes;
