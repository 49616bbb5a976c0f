//! WebhookEventRepository port - ledger of verified webhook deliveries.
//!
//! Processors deliver at least once. Every mutation the dispatchers perform
//! is a value-set, so replaying an event is harmless today, but the ledger
//! lets a redelivery of an already-applied event skip the store entirely and
//! leaves an audit trail of what each event did.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::billing::Processor;
use crate::domain::foundation::DomainError;

/// What dispatching an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// At least one account row was patched.
    Applied,
    /// The event was understood but no account matched its correlation id.
    Unmatched,
    /// Unhandled type or no correlation id on the resource.
    Ignored,
    /// Dispatch failed after verification; the event was still acknowledged.
    Failed,
}

impl EventOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOutcome::Applied => "applied",
            EventOutcome::Unmatched => "unmatched",
            EventOutcome::Ignored => "ignored",
            EventOutcome::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(EventOutcome::Applied),
            "unmatched" => Some(EventOutcome::Unmatched),
            "ignored" => Some(EventOutcome::Ignored),
            "failed" => Some(EventOutcome::Failed),
            _ => None,
        }
    }

    /// Outcomes that make a redelivery pointless.
    ///
    /// Failed deliveries are re-run: the store may have recovered.
    pub fn is_final(&self) -> bool {
        !matches!(self, EventOutcome::Failed)
    }
}

/// Ledger row for one verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEventRecord {
    pub processor: Processor,
    pub event_id: String,
    pub event_type: String,
    pub outcome: EventOutcome,
    pub detail: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl WebhookEventRecord {
    pub fn new(
        processor: Processor,
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: EventOutcome,
    ) -> Self {
        Self {
            processor,
            event_id: event_id.into(),
            event_type: event_type.into(),
            outcome,
            detail: None,
            processed_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Finds the ledger row for an event, if it was seen before.
    async fn find(
        &self,
        processor: Processor,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Inserts or overwrites the ledger row for an event.
    async fn record(&self, record: WebhookEventRecord) -> Result<(), DomainError>;

    /// Deletes rows processed before `cutoff`; returns how many went.
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
