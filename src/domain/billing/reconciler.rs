//! Maps verified webhook events to account patches.
//!
//! Pure: the dispatcher decides *what* to write and *which rows* to write it
//! to; persistence happens in the application layer.

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::foundation::{Email, Timestamp};

use super::paypal_event::PayPalEventKind;
use super::stripe_event::StripeEventKind;

/// What to do with a verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Apply {
        selector: AccountSelector,
        patch: BillingPatch,
    },
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The resource carries no identity we can map to an account.
    NoCorrelation,
    /// The event type is deliberately not acted on.
    Unhandled(String),
}

impl SkipReason {
    pub fn describe(&self) -> String {
        match self {
            SkipReason::NoCorrelation => "no correlation id on resource".to_string(),
            SkipReason::Unhandled(event_type) => format!("unhandled event type {}", event_type),
        }
    }
}

/// Stripe events correlate on the customer id.
pub fn reconcile_stripe(kind: StripeEventKind, observed_at: Timestamp) -> Reconciliation {
    let patch = BillingPatch::at(observed_at);
    match kind {
        StripeEventKind::PaymentMethodAttached(pm) => {
            let Some(customer) = pm.customer else {
                return Reconciliation::Skip(SkipReason::NoCorrelation);
            };
            let last4 = pm.card.and_then(|c| c.last4);
            Reconciliation::Apply {
                selector: AccountSelector::StripeCustomer(customer),
                patch: patch.with_default_payment_method(pm.id, last4),
            }
        }
        StripeEventKind::Subscription(_, sub) => {
            let price_id = sub.price_id().map(str::to_string);
            let Some(customer) = sub.customer else {
                return Reconciliation::Skip(SkipReason::NoCorrelation);
            };
            let mut patch = patch.with_status(sub.status.clone());
            patch.stripe_subscription_id = Some(sub.id);
            patch.stripe_price_id = price_id;
            // Subscription events only ever raise the flag; invoices clear it.
            if sub.status == "past_due" {
                patch.past_due = Some(true);
            }
            Reconciliation::Apply {
                selector: AccountSelector::StripeCustomer(customer),
                patch,
            }
        }
        StripeEventKind::InvoicePaymentSucceeded(invoice) => {
            invoice_outcome(invoice, patch.with_past_due(false))
        }
        StripeEventKind::InvoicePaymentFailed(invoice) => {
            invoice_outcome(invoice, patch.with_past_due(true))
        }
        StripeEventKind::Unhandled(event_type) => {
            Reconciliation::Skip(SkipReason::Unhandled(event_type))
        }
    }
}

fn invoice_outcome(
    invoice: super::stripe_event::InvoiceObject,
    mut patch: BillingPatch,
) -> Reconciliation {
    let Some(customer) = invoice.customer else {
        return Reconciliation::Skip(SkipReason::NoCorrelation);
    };
    patch.stripe_latest_invoice_id = Some(invoice.id);
    patch.stripe_latest_invoice_status = invoice.status;
    Reconciliation::Apply {
        selector: AccountSelector::StripeCustomer(customer),
        patch,
    }
}

/// PayPal events correlate on the subscriber or payer email, and for
/// cancellation and failed payments additionally on the subscription id.
pub fn reconcile_paypal(kind: PayPalEventKind, observed_at: Timestamp) -> Reconciliation {
    let patch = BillingPatch::at(observed_at);
    match kind {
        PayPalEventKind::SubscriptionCreated(sub) | PayPalEventKind::SubscriptionUpdated(sub) => {
            let Some(email) = parse_email(sub.subscriber_email()) else {
                return Reconciliation::Skip(SkipReason::NoCorrelation);
            };
            let mut patch = patch.with_status_value(sub.status);
            patch.paypal_subscription_id = Some(sub.id);
            // Plan ids share the price column with Stripe price ids.
            patch.stripe_price_id = sub.plan_id;
            Reconciliation::Apply {
                selector: AccountSelector::Email(email),
                patch,
            }
        }
        PayPalEventKind::SubscriptionCancelled(sub) => {
            let Some(email) = parse_email(sub.subscriber_email()) else {
                return Reconciliation::Skip(SkipReason::NoCorrelation);
            };
            Reconciliation::Apply {
                selector: AccountSelector::PayPalSubscriber {
                    email,
                    subscription_id: sub.id,
                },
                patch: patch.with_status("cancelled"),
            }
        }
        PayPalEventKind::SubscriptionPaymentFailed(sub) => {
            let Some(email) = parse_email(sub.subscriber_email()) else {
                return Reconciliation::Skip(SkipReason::NoCorrelation);
            };
            Reconciliation::Apply {
                selector: AccountSelector::PayPalSubscriber {
                    email,
                    subscription_id: sub.id,
                },
                patch: patch.with_past_due(true),
            }
        }
        // TODO: correlate sales to a billing agreement so a PayPal sale cannot
        // clear past_due raised by a Stripe subscription on the same account.
        PayPalEventKind::SaleCompleted(sale) => sale_outcome(sale.payer_email, patch.with_past_due(false)),
        PayPalEventKind::SaleDenied(sale) => sale_outcome(sale.payer_email, patch.with_past_due(true)),
        PayPalEventKind::Unhandled(event_type) => {
            Reconciliation::Skip(SkipReason::Unhandled(event_type))
        }
    }
}

fn sale_outcome(payer_email: Option<String>, patch: BillingPatch) -> Reconciliation {
    match parse_email(payer_email.as_deref()) {
        Some(email) => Reconciliation::Apply {
            selector: AccountSelector::Email(email),
            patch,
        },
        None => Reconciliation::Skip(SkipReason::NoCorrelation),
    }
}

fn parse_email(raw: Option<&str>) -> Option<Email> {
    raw.and_then(|e| Email::new(e).ok())
}
