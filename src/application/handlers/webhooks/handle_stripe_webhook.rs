//! HandleStripeWebhookHandler - verifies a Stripe delivery and dispatches it.

use std::sync::Arc;

use crate::domain::billing::{
    reconcile_stripe, Processor, StripeEvent, StripeWebhookVerifier, WebhookError,
};
use crate::ports::{AccountRepository, WebhookEventRepository};

use super::dispatcher::{VerifiedEvent, WebhookDispatcher, WebhookOutcome};

/// Raw Stripe delivery.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Exact request body bytes; the signature covers these.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: Option<String>,
}

/// Handler for Stripe webhooks.
///
/// `handle` errors only when the delivery cannot be verified. A verified
/// event always yields `Ok`, whatever happened to the account store.
pub struct HandleStripeWebhookHandler {
    verifier: Option<StripeWebhookVerifier>,
    dispatcher: WebhookDispatcher,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        verifier: Option<StripeWebhookVerifier>,
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            verifier,
            dispatcher: WebhookDispatcher::new(accounts, ledger),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self.verify(&cmd)?;

        let reconciliation = event
            .kind()
            .map(|kind| reconcile_stripe(kind, event.observed_at()))
            .map_err(|e| e.to_string());

        Ok(self
            .dispatcher
            .dispatch(VerifiedEvent {
                processor: Processor::Stripe,
                event_id: event.id,
                event_type: event.event_type,
                reconciliation,
            })
            .await)
    }

    fn verify(&self, cmd: &HandleStripeWebhookCommand) -> Result<StripeEvent, WebhookError> {
        let Some(verifier) = &self.verifier else {
            tracing::error!("Stripe webhook secret is not configured");
            return Err(WebhookError::NotConfigured("Webhook not configured"));
        };

        let Some(signature) = cmd.signature.as_deref() else {
            tracing::warn!("Missing Stripe-Signature header");
            return Err(WebhookError::MissingHeaders("Missing Stripe-Signature header"));
        };

        verifier
            .verify_and_parse(&cmd.payload, signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Stripe webhook signature verification failed");
                e
            })
    }
}
