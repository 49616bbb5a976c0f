//! Billing reconciliation domain.
//!
//! Webhook envelopes and their closed event kinds, Stripe signature
//! verification, the event-to-patch rules, and billing history assembly.

mod errors;
mod history;
mod paypal_event;
mod processor;
mod reconciler;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use errors::BillingError;
pub use history::{
    BillingHistory, ChargeRecord, InvoiceRecord, PaymentIntentRecord, Transaction,
    TransactionType, HISTORY_PAGE_LIMIT, HISTORY_WINDOW_DAYS,
};
pub use paypal_event::{PayPalEvent, PayPalEventKind, SaleResource, SubscriptionResource};
pub use processor::Processor;
pub use reconciler::{reconcile_paypal, reconcile_stripe, Reconciliation, SkipReason};
pub use stripe_event::{
    InvoiceObject, PaymentMethodObject, StripeEvent, StripeEventKind, SubscriptionChange,
    SubscriptionObject,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub(crate) use paypal_event::paypal_event;
#[cfg(test)]
pub(crate) use stripe_event::StripeEventBuilder;
