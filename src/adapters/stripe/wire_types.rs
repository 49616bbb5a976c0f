//! Stripe API response shapes.
//!
//! Only the fields the gateway reads are modeled; serde ignores the rest.

use serde::Deserialize;

use crate::domain::billing::{ChargeRecord, InvoiceRecord, PaymentIntentRecord};
use crate::ports::{PaymentIntent, PaymentMethod, SetupIntent, StripeCustomer, StripeSubscription};

/// A field Stripe returns either as an id or, when expanded, as the object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn into_object(self) -> Option<T> {
        match self {
            Expandable::Object(obj) => Some(*obj),
            Expandable::Id(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

/// Error envelope: `{"error": {"message": "...", "code": "...", "type": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerWire {
    pub id: String,
}

impl From<CustomerWire> for StripeCustomer {
    fn from(wire: CustomerWire) -> Self {
        StripeCustomer { id: wire.id }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetupIntentWire {
    pub id: String,
    pub client_secret: Option<String>,
}

impl From<SetupIntentWire> for SetupIntent {
    fn from(wire: SetupIntentWire) -> Self {
        SetupIntent {
            id: wire.id,
            client_secret: wire.client_secret,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodWire {
    pub id: String,
    pub customer: Option<String>,
    pub card: Option<CardWire>,
}

#[derive(Debug, Deserialize)]
pub struct CardWire {
    pub last4: Option<String>,
}

impl From<PaymentMethodWire> for PaymentMethod {
    fn from(wire: PaymentMethodWire) -> Self {
        PaymentMethod {
            id: wire.id,
            customer: wire.customer,
            card_last4: wire.card.and_then(|c| c.last4),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentWire {
    pub id: String,
    pub status: String,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub created: i64,
    pub description: Option<String>,
}

impl From<PaymentIntentWire> for PaymentIntent {
    fn from(wire: PaymentIntentWire) -> Self {
        PaymentIntent {
            id: wire.id,
            status: wire.status,
            client_secret: wire.client_secret,
        }
    }
}

impl From<PaymentIntentWire> for PaymentIntentRecord {
    fn from(wire: PaymentIntentWire) -> Self {
        PaymentIntentRecord {
            id: wire.id,
            amount: wire.amount,
            currency: wire.currency,
            status: wire.status,
            created: wire.created,
            description: wire.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionWire {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub current_period_end: Option<i64>,
    pub latest_invoice: Option<Expandable<SubscriptionInvoiceWire>>,
}

/// The part of an expanded `latest_invoice` the subscription flow needs.
#[derive(Debug, Deserialize)]
pub struct SubscriptionInvoiceWire {
    pub payment_intent: Option<Expandable<PaymentIntentWire>>,
}

impl From<SubscriptionWire> for StripeSubscription {
    fn from(wire: SubscriptionWire) -> Self {
        let latest_payment_intent = wire
            .latest_invoice
            .and_then(Expandable::into_object)
            .and_then(|invoice| invoice.payment_intent)
            .and_then(Expandable::into_object)
            .map(PaymentIntent::from);

        StripeSubscription {
            id: wire.id,
            status: wire.status,
            cancel_at_period_end: wire.cancel_at_period_end,
            canceled_at: wire.canceled_at,
            current_period_end: wire.current_period_end,
            latest_payment_intent,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InvoiceWire {
    pub id: String,
    pub number: Option<String>,
    #[serde(default)]
    pub amount_paid: i64,
    pub currency: String,
    pub status: Option<String>,
    pub created: i64,
    pub period_start: Option<i64>,
    pub period_end: Option<i64>,
    pub description: Option<String>,
    pub lines: Option<StripeList<InvoiceLineWire>>,
    pub hosted_invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
    pub payment_intent: Option<Expandable<IdOnly>>,
    pub charge: Option<Expandable<IdOnly>>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceLineWire {
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdOnly {
    pub id: String,
}

fn expandable_id(field: Option<Expandable<IdOnly>>) -> Option<String> {
    field.map(|f| match f {
        Expandable::Id(id) => id,
        Expandable::Object(obj) => obj.id,
    })
}

impl From<InvoiceWire> for InvoiceRecord {
    fn from(wire: InvoiceWire) -> Self {
        let line_description = wire
            .lines
            .and_then(|lines| lines.data.into_iter().next())
            .and_then(|line| line.description);

        InvoiceRecord {
            id: wire.id,
            number: wire.number,
            amount_paid: wire.amount_paid,
            currency: wire.currency,
            status: wire.status,
            created: wire.created,
            period_start: wire.period_start,
            period_end: wire.period_end,
            description: wire.description,
            line_description,
            hosted_invoice_url: wire.hosted_invoice_url,
            invoice_pdf: wire.invoice_pdf,
            payment_intent: expandable_id(wire.payment_intent),
            charge: expandable_id(wire.charge),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChargeWire {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created: i64,
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
    pub payment_intent: Option<String>,
    pub receipt_number: Option<String>,
    pub receipt_url: Option<String>,
}

impl From<ChargeWire> for ChargeRecord {
    fn from(mut wire: ChargeWire) -> Self {
        ChargeRecord {
            id: wire.id,
            amount: wire.amount,
            currency: wire.currency,
            status: wire.status,
            created: wire.created,
            description: wire.description,
            metadata_description: wire.metadata.remove("description"),
            payment_intent: wire.payment_intent,
            receipt_number: wire.receipt_number,
            receipt_url: wire.receipt_url,
        }
    }
}
