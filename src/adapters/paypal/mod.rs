//! PayPal adapters.
//!
//! - `PayPalGatewayAdapter` - REST client with a cached client-credentials token
//! - `MockPayPalGateway` - in-process fake for tests

mod mock_paypal_gateway;
mod paypal_adapter;
mod wire_types;

pub use mock_paypal_gateway::MockPayPalGateway;
pub use paypal_adapter::{PayPalApiConfig, PayPalGatewayAdapter};
