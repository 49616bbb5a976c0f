//! PayPal webhook event envelope and the closed set of event kinds we act on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// PayPal webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PayPalEvent {
    /// Unique identifier for the event (WH-...).
    pub id: String,

    /// Event type tag, e.g. "BILLING.SUBSCRIPTION.CANCELLED".
    pub event_type: String,

    /// Creation time at PayPal; absent on some sandbox simulations.
    pub create_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub resource: serde_json::Value,
}

/// `subscription` resource, as carried by `BILLING.SUBSCRIPTION.*`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SubscriptionResource {
    pub id: String,
    pub status: Option<String>,
    pub plan_id: Option<String>,
    pub subscriber: Option<Subscriber>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Subscriber {
    pub email_address: Option<String>,
}

impl SubscriptionResource {
    pub fn subscriber_email(&self) -> Option<&str> {
        self.subscriber.as_ref()?.email_address.as_deref()
    }
}

/// `sale` resource, as carried by `PAYMENT.SALE.*`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SaleResource {
    pub id: String,
    pub payer_email: Option<String>,
}

/// Every PayPal event type the dispatcher knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayPalEventKind {
    SubscriptionCreated(SubscriptionResource),
    SubscriptionUpdated(SubscriptionResource),
    SubscriptionCancelled(SubscriptionResource),
    SubscriptionPaymentFailed(SubscriptionResource),
    SaleCompleted(SaleResource),
    SaleDenied(SaleResource),
    Unhandled(String),
}

impl PayPalEvent {
    /// Time of the event at PayPal; falls back to receipt time when absent.
    pub fn observed_at(&self) -> Timestamp {
        self.create_time
            .map(Timestamp::from_datetime)
            .unwrap_or_else(Timestamp::now)
    }

    fn resource<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.resource.clone())
    }

    /// Classifies the event and decodes its resource.
    pub fn kind(&self) -> Result<PayPalEventKind, serde_json::Error> {
        let kind = match self.event_type.as_str() {
            "BILLING.SUBSCRIPTION.CREATED" => PayPalEventKind::SubscriptionCreated(self.resource()?),
            "BILLING.SUBSCRIPTION.UPDATED" => PayPalEventKind::SubscriptionUpdated(self.resource()?),
            "BILLING.SUBSCRIPTION.CANCELLED" => {
                PayPalEventKind::SubscriptionCancelled(self.resource()?)
            }
            "BILLING.SUBSCRIPTION.PAYMENT.FAILED" => {
                PayPalEventKind::SubscriptionPaymentFailed(self.resource()?)
            }
            "PAYMENT.SALE.COMPLETED" => PayPalEventKind::SaleCompleted(self.resource()?),
            "PAYMENT.SALE.DENIED" => PayPalEventKind::SaleDenied(self.resource()?),
            other => PayPalEventKind::Unhandled(other.to_string()),
        };
        Ok(kind)
    }
}

#[cfg(test)]
pub fn paypal_event(event_type: &str, resource: serde_json::Value) -> PayPalEvent {
    PayPalEvent {
        id: "WH-TEST-1".to_string(),
        event_type: event_type.to_string(),
        create_time: DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        resource,
    }
}
