//! Post-verification dispatch shared by both processors' webhook handlers.
//!
//! Nothing in here can fail the request: every error is logged, recorded in
//! the ledger where possible, and folded into a [`WebhookOutcome`].

use std::sync::Arc;

use crate::domain::billing::{Processor, Reconciliation, SkipReason};
use crate::ports::{AccountRepository, EventOutcome, WebhookEventRecord, WebhookEventRepository};

/// What dispatch did with a verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The patch reached `matched` rows; `stale` of them kept their newer status.
    Applied { matched: u64, stale: u64 },
    /// No account correlates with the event.
    Unmatched,
    /// Event type deliberately not acted on.
    Ignored,
    /// Already processed to a final outcome.
    Duplicate,
    /// Persistence or decoding failed after verification.
    Failed(String),
}

impl WebhookOutcome {
    fn ledger_outcome(&self) -> Option<EventOutcome> {
        match self {
            WebhookOutcome::Applied { .. } => Some(EventOutcome::Applied),
            WebhookOutcome::Unmatched => Some(EventOutcome::Unmatched),
            WebhookOutcome::Ignored => Some(EventOutcome::Ignored),
            WebhookOutcome::Failed(_) => Some(EventOutcome::Failed),
            WebhookOutcome::Duplicate => None,
        }
    }
}

/// A verified event reduced to what dispatch needs.
#[derive(Debug, Clone)]
pub struct VerifiedEvent {
    pub processor: Processor,
    pub event_id: String,
    pub event_type: String,
    /// The reconciliation decision, or the reason the payload could not be decoded.
    pub reconciliation: Result<Reconciliation, String>,
}

/// Applies reconciliation decisions to the account store and keeps the ledger.
#[derive(Clone)]
pub struct WebhookDispatcher {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn WebhookEventRepository>,
}

impl WebhookDispatcher {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self { accounts, ledger }
    }

    pub async fn dispatch(&self, event: VerifiedEvent) -> WebhookOutcome {
        let processor = event.processor;
        let event_id = event.event_id.as_str();
        let event_type = event.event_type.as_str();

        match self.ledger.find(processor, event_id).await {
            Ok(Some(seen)) if seen.outcome.is_final() => {
                tracing::info!(
                    %processor,
                    event_id,
                    event_type,
                    previous = seen.outcome.as_str(),
                    "Skipping already processed webhook event"
                );
                return WebhookOutcome::Duplicate;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%processor, event_id, error = %e, "Webhook ledger lookup failed");
            }
        }

        let outcome = self.apply(&event).await;
        self.record(&event, &outcome).await;
        outcome
    }

    async fn apply(&self, event: &VerifiedEvent) -> WebhookOutcome {
        let processor = event.processor;
        let event_id = event.event_id.as_str();
        let event_type = event.event_type.as_str();

        let reconciliation = match &event.reconciliation {
            Ok(r) => r,
            Err(reason) => {
                tracing::error!(
                    %processor,
                    event_id,
                    event_type,
                    error = %reason,
                    "Could not decode webhook resource"
                );
                return WebhookOutcome::Failed(reason.clone());
            }
        };

        match reconciliation {
            Reconciliation::Skip(SkipReason::Unhandled(_)) => {
                tracing::info!(%processor, event_id, event_type, "Unhandled event type");
                WebhookOutcome::Ignored
            }
            Reconciliation::Skip(SkipReason::NoCorrelation) => {
                tracing::info!(
                    %processor,
                    event_id,
                    event_type,
                    "Event carries no correlation id, nothing to update"
                );
                WebhookOutcome::Unmatched
            }
            Reconciliation::Apply { selector, patch } => {
                match self.accounts.apply_patch(selector, patch).await {
                    Ok(result) if result.is_no_match() => {
                        tracing::info!(
                            %processor,
                            event_id,
                            event_type,
                            %selector,
                            "No account matches webhook event"
                        );
                        WebhookOutcome::Unmatched
                    }
                    Ok(result) => {
                        if result.stale > 0 {
                            tracing::warn!(
                                %processor,
                                event_id,
                                event_type,
                                %selector,
                                observed_at = ?patch.observed_at,
                                "Older event did not overwrite newer billing status"
                            );
                        }
                        tracing::info!(
                            %processor,
                            event_id,
                            event_type,
                            %selector,
                            matched = result.matched,
                            "Applied webhook event"
                        );
                        WebhookOutcome::Applied {
                            matched: result.matched,
                            stale: result.stale,
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            %processor,
                            event_id,
                            event_type,
                            %selector,
                            error = %e,
                            "Failed to apply webhook event; acknowledging anyway"
                        );
                        WebhookOutcome::Failed(e.message)
                    }
                }
            }
        }
    }

    async fn record(&self, event: &VerifiedEvent, outcome: &WebhookOutcome) {
        let Some(ledger_outcome) = outcome.ledger_outcome() else {
            return;
        };
        let mut record = WebhookEventRecord::new(
            event.processor,
            event.event_id.clone(),
            event.event_type.clone(),
            ledger_outcome,
        );
        if let WebhookOutcome::Failed(reason) = outcome {
            record = record.with_detail(reason.clone());
        }
        if let Err(e) = self.ledger.record(record).await {
            tracing::warn!(
                processor = %event.processor,
                event_id = %event.event_id,
                error = %e,
                "Failed to record webhook event"
            );
        }
    }
}
