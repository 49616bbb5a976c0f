//! Ports - interfaces between the application core and the outside world.
//!
//! Adapters in `crate::adapters` implement these traits; handlers depend on
//! them only through `Arc<dyn Trait>`.

mod account_repository;
mod gateway_error;
mod password_hasher;
mod paypal_gateway;
mod stripe_gateway;
mod webhook_event_repository;

pub use account_repository::AccountRepository;
pub use gateway_error::{GatewayError, GatewayErrorCode};
pub use password_hasher::PasswordHasher;
pub use paypal_gateway::{
    CapturedOrder, CreateOrderRequest, CreatePayPalSubscriptionRequest, Link, PayPalGateway,
    PayPalOrder, PayPalSubscription, VerifyWebhookSignature,
};
pub use stripe_gateway::{
    CreateSubscriptionRequest, PaymentIntent, PaymentMethod, SetupIntent, StripeCustomer,
    StripeGateway, StripeSubscription,
};
pub use webhook_event_repository::{EventOutcome, WebhookEventRecord, WebhookEventRepository};
