//! PayPal command and query handlers.
//!
//! Same resolve-by-email, require-prior-linkage, persist-result shape as the
//! Stripe handlers.

mod cancel_subscription;
mod capture_order;
mod create_order;
mod create_subscription;
mod get_subscription;

pub use cancel_subscription::{CancelPayPalSubscriptionCommand, CancelPayPalSubscriptionHandler};
pub use capture_order::{CaptureOrderCommand, CaptureOrderHandler, CaptureOrderResult};
pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use create_subscription::{
    CreatePayPalSubscriptionCommand, CreatePayPalSubscriptionHandler,
    CreatePayPalSubscriptionResult,
};
pub use get_subscription::{GetPayPalSubscriptionHandler, GetPayPalSubscriptionQuery};
