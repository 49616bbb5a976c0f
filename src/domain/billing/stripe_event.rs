//! Stripe webhook event envelope and the closed set of event kinds we act on.
//!
//! Only fields relevant to reconciliation are captured; everything else in
//! Stripe's schema is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx).
    pub id: String,

    /// Event type tag, e.g. "invoice.payment_failed".
    #[serde(rename = "type")]
    pub event_type: String,

    /// Creation time at Stripe (Unix seconds).
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object the event describes; its shape depends on the event type.
    pub object: serde_json::Value,
}

/// `payment_method` object, as carried by `payment_method.attached`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentMethodObject {
    pub id: String,
    pub customer: Option<String>,
    pub card: Option<CardDetails>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CardDetails {
    pub last4: Option<String>,
}

/// `subscription` object, as carried by `customer.subscription.*`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: Option<String>,
    pub status: String,
    pub items: Option<SubscriptionItems>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SubscriptionItem {
    pub price: Option<PriceRef>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PriceRef {
    pub id: String,
}

impl SubscriptionObject {
    /// Price of the first subscription item, if any.
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .as_ref()?
            .data
            .first()?
            .price
            .as_ref()
            .map(|p| p.id.as_str())
    }
}

/// `invoice` object, as carried by `invoice.payment_*`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InvoiceObject {
    pub id: String,
    pub customer: Option<String>,
    pub status: Option<String>,
}

/// Which lifecycle step a subscription event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionChange {
    Created,
    Updated,
    Deleted,
}

/// Every Stripe event type the dispatcher knows about.
///
/// Adding a variant forces every `match` over this enum to decide how to
/// treat it; anything else lands in `Unhandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventKind {
    PaymentMethodAttached(PaymentMethodObject),
    Subscription(SubscriptionChange, SubscriptionObject),
    InvoicePaymentSucceeded(InvoiceObject),
    InvoicePaymentFailed(InvoiceObject),
    Unhandled(String),
}

impl StripeEvent {
    /// Time of the event at Stripe, used to order status writes.
    pub fn observed_at(&self) -> Timestamp {
        Timestamp::from_unix(self.created).unwrap_or_else(Timestamp::now)
    }

    fn object<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Classifies the event and decodes its object.
    ///
    /// Fails only when a known event type carries an object we cannot read.
    pub fn kind(&self) -> Result<StripeEventKind, serde_json::Error> {
        let kind = match self.event_type.as_str() {
            "payment_method.attached" => StripeEventKind::PaymentMethodAttached(self.object()?),
            "customer.subscription.created" => {
                StripeEventKind::Subscription(SubscriptionChange::Created, self.object()?)
            }
            "customer.subscription.updated" => {
                StripeEventKind::Subscription(SubscriptionChange::Updated, self.object()?)
            }
            "customer.subscription.deleted" => {
                StripeEventKind::Subscription(SubscriptionChange::Deleted, self.object()?)
            }
            "invoice.payment_succeeded" => StripeEventKind::InvoicePaymentSucceeded(self.object()?),
            "invoice.payment_failed" => StripeEventKind::InvoicePaymentFailed(self.object()?),
            other => StripeEventKind::Unhandled(other.to_string()),
        };
        Ok(kind)
    }
}

/// Builder for test events.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new(event_type: &str) -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: event_type.to_string(),
            created: 1_700_000_000,
            object: serde_json::json!({}),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData { object: self.object },
            livemode: false,
        }
    }
}
