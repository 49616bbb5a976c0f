//! Webhook handlers.
//!
//! Each handler runs `verify` then `dispatch`. Verification failures are the
//! only errors returned to the route; everything after is folded into a
//! [`WebhookOutcome`] and acknowledged.

mod dispatcher;
mod handle_paypal_webhook;
mod handle_stripe_webhook;

pub use dispatcher::{VerifiedEvent, WebhookDispatcher, WebhookOutcome};
pub use handle_paypal_webhook::{
    HandlePayPalWebhookCommand, HandlePayPalWebhookHandler, PayPalTransmission,
};
pub use handle_stripe_webhook::{HandleStripeWebhookCommand, HandleStripeWebhookHandler};
