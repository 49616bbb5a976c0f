//! Stripe adapters.
//!
//! - `StripeGatewayAdapter` - REST client for Stripe's API
//! - `MockStripeGateway` - in-process fake for tests and local development

mod mock_stripe_gateway;
mod stripe_adapter;
mod wire_types;

pub use mock_stripe_gateway::{MethodCall, MockStripeGateway};
pub use stripe_adapter::{StripeApiConfig, StripeGatewayAdapter};
