//! HandlePayPalWebhookHandler - verifies a PayPal delivery through PayPal's
//! verification API and dispatches it.

use std::sync::Arc;

use serde_json::value::RawValue;

use crate::domain::billing::{reconcile_paypal, PayPalEvent, Processor, WebhookError};
use crate::ports::{
    AccountRepository, PayPalGateway, VerifyWebhookSignature, WebhookEventRepository,
};

use super::dispatcher::{VerifiedEvent, WebhookDispatcher, WebhookOutcome};

/// The five `paypal-*` transmission headers.
#[derive(Debug, Clone, Default)]
pub struct PayPalTransmission {
    pub transmission_id: Option<String>,
    pub transmission_time: Option<String>,
    pub transmission_sig: Option<String>,
    pub cert_url: Option<String>,
    pub auth_algo: Option<String>,
}

struct CompleteTransmission {
    transmission_id: String,
    transmission_time: String,
    transmission_sig: String,
    cert_url: String,
    auth_algo: String,
}

impl PayPalTransmission {
    fn complete(self) -> Option<CompleteTransmission> {
        Some(CompleteTransmission {
            transmission_id: self.transmission_id.filter(|v| !v.is_empty())?,
            transmission_time: self.transmission_time.filter(|v| !v.is_empty())?,
            transmission_sig: self.transmission_sig.filter(|v| !v.is_empty())?,
            cert_url: self.cert_url.filter(|v| !v.is_empty())?,
            auth_algo: self.auth_algo.filter(|v| !v.is_empty())?,
        })
    }
}

/// Raw PayPal delivery.
#[derive(Debug, Clone)]
pub struct HandlePayPalWebhookCommand {
    pub payload: Vec<u8>,
    pub transmission: PayPalTransmission,
}

/// Handler for PayPal webhooks.
///
/// Only verification can fail `handle`; see [`WebhookOutcome`] for what
/// happens after.
pub struct HandlePayPalWebhookHandler {
    gateway: Option<Arc<dyn PayPalGateway>>,
    webhook_id: Option<String>,
    dispatcher: WebhookDispatcher,
}

impl HandlePayPalWebhookHandler {
    pub fn new(
        gateway: Option<Arc<dyn PayPalGateway>>,
        webhook_id: Option<String>,
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            gateway,
            webhook_id,
            dispatcher: WebhookDispatcher::new(accounts, ledger),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePayPalWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self.verify(cmd).await?;

        let reconciliation = event
            .kind()
            .map(|kind| reconcile_paypal(kind, event.observed_at()))
            .map_err(|e| e.to_string());

        Ok(self
            .dispatcher
            .dispatch(VerifiedEvent {
                processor: Processor::PayPal,
                event_id: event.id,
                event_type: event.event_type,
                reconciliation,
            })
            .await)
    }

    async fn verify(&self, cmd: HandlePayPalWebhookCommand) -> Result<PayPalEvent, WebhookError> {
        let Some(gateway) = &self.gateway else {
            tracing::error!("PayPal is not configured for webhook handling");
            return Err(WebhookError::NotConfigured("PayPal webhook not configured"));
        };
        let Some(webhook_id) = &self.webhook_id else {
            tracing::error!("PayPal webhook id is not configured");
            return Err(WebhookError::NotConfigured("Webhook not configured"));
        };
        let Some(transmission) = cmd.transmission.complete() else {
            tracing::warn!("Missing PayPal webhook headers");
            return Err(WebhookError::MissingHeaders("Missing required webhook headers"));
        };

        let body = String::from_utf8(cmd.payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let event: PayPalEvent =
            serde_json::from_str(&body).map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let webhook_event =
            RawValue::from_string(body).map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let status = gateway
            .verify_webhook_signature(VerifyWebhookSignature {
                auth_algo: transmission.auth_algo,
                cert_url: transmission.cert_url,
                transmission_id: transmission.transmission_id,
                transmission_sig: transmission.transmission_sig,
                transmission_time: transmission.transmission_time,
                webhook_id: webhook_id.clone(),
                webhook_event,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "PayPal webhook verification call failed");
                WebhookError::VerificationError(e.message)
            })?;

        if status != "SUCCESS" {
            tracing::warn!(verification_status = %status, "PayPal webhook signature verification failed");
            return Err(WebhookError::VerificationFailed);
        }

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountRepository, InMemoryWebhookEventRepository};
    use crate::adapters::paypal::MockPayPalGateway;
    use crate::domain::account::{Account, NewAccount};
    use crate::domain::foundation::Email;
    use crate::ports::GatewayError;

    fn account(email: &str, subscription: Option<&str>) -> Account {
        let mut acct = Account::register(NewAccount {
            email: Email::new(email).unwrap(),
            password_hash: "h".to_string(),
            plan: "basic".to_string(),
            card_last4: None,
            card_on_file: Default::default(),
        });
        acct.paypal_subscription_id = subscription.map(str::to_string);
        acct
    }

    fn headers() -> PayPalTransmission {
        PayPalTransmission {
            transmission_id: Some("tx-1".to_string()),
            transmission_time: Some("2024-03-01T12:00:00Z".to_string()),
            transmission_sig: Some("sig".to_string()),
            cert_url: Some("https://api.paypal.com/cert.pem".to_string()),
            auth_algo: Some("SHA256withRSA".to_string()),
        }
    }

    fn delivery(payload: serde_json::Value) -> HandlePayPalWebhookCommand {
        HandlePayPalWebhookCommand {
            payload: serde_json::to_vec(&payload).unwrap(),
            transmission: headers(),
        }
    }

    fn payment_failed(subscription_id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "WH-1",
            "event_type": "BILLING.SUBSCRIPTION.PAYMENT.FAILED",
            "create_time": "2024-03-01T12:00:00Z",
            "resource": {
                "id": subscription_id,
                "subscriber": { "email_address": "a@x.com" }
            }
        })
    }

    fn handler(
        gateway: Option<MockPayPalGateway>,
        accounts: &InMemoryAccountRepository,
    ) -> HandlePayPalWebhookHandler {
        HandlePayPalWebhookHandler::new(
            gateway.map(|g| Arc::new(g) as Arc<dyn PayPalGateway>),
            Some("WH-CONFIG-1".to_string()),
            Arc::new(accounts.clone()),
            Arc::new(InMemoryWebhookEventRepository::new()),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Verification
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn no_client_is_not_configured() {
        let accounts = InMemoryAccountRepository::new();
        let err = handler(None, &accounts)
            .handle(delivery(payment_failed("I-1")))
            .await
            .unwrap_err();
        assert_eq!(err, WebhookError::NotConfigured("PayPal webhook not configured"));
    }

    #[tokio::test]
    async fn no_webhook_id_is_not_configured() {
        let accounts = InMemoryAccountRepository::new();
        let handler = HandlePayPalWebhookHandler::new(
            Some(Arc::new(MockPayPalGateway::new())),
            None,
            Arc::new(accounts.clone()),
            Arc::new(InMemoryWebhookEventRepository::new()),
        );
        let err = handler.handle(delivery(payment_failed("I-1"))).await.unwrap_err();
        assert_eq!(err, WebhookError::NotConfigured("Webhook not configured"));
    }

    #[tokio::test]
    async fn any_missing_header_is_rejected() {
        let accounts = InMemoryAccountRepository::new();
        let handler = handler(Some(MockPayPalGateway::new()), &accounts);
        let mut cmd = delivery(payment_failed("I-1"));
        cmd.transmission.cert_url = None;

        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, WebhookError::MissingHeaders("Missing required webhook headers"));
    }

    #[tokio::test]
    async fn failure_status_is_rejected_without_mutation() {
        let accounts = InMemoryAccountRepository::new();
        accounts.seed(account("a@x.com", Some("I-1"))).await;
        let before = accounts.all().await;
        let handler = handler(Some(MockPayPalGateway::rejecting_webhooks()), &accounts);

        let err = handler.handle(delivery(payment_failed("I-1"))).await.unwrap_err();

        assert_eq!(err, WebhookError::VerificationFailed);
        assert_eq!(accounts.all().await, before);
    }

    #[tokio::test]
    async fn verification_call_error_is_rejected() {
        let accounts = InMemoryAccountRepository::new();
        let gateway = MockPayPalGateway::new();
        gateway.set_method_error("verify_webhook_signature", GatewayError::network("timed out"));
        let handler = handler(Some(gateway), &accounts);

        let err = handler.handle(delivery(payment_failed("I-1"))).await.unwrap_err();

        assert_eq!(err, WebhookError::VerificationError("timed out".into()));
    }

    #[tokio::test]
    async fn verification_request_carries_headers_and_event() {
        let accounts = InMemoryAccountRepository::new();
        let gateway = MockPayPalGateway::new();
        let handler = handler(Some(gateway.clone()), &accounts);

        handler.handle(delivery(payment_failed("I-1"))).await.unwrap();

        let requests = gateway.verify_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].webhook_id, "WH-CONFIG-1");
        assert_eq!(requests[0].transmission_id, "tx-1");
        let sent: serde_json::Value = serde_json::from_str(requests[0].webhook_event.get()).unwrap();
        assert_eq!(sent["id"], "WH-1");
    }

    #[tokio::test]
    async fn verification_request_echoes_body_bytes() {
        let accounts = InMemoryAccountRepository::new();
        let gateway = MockPayPalGateway::new();
        let handler = handler(Some(gateway.clone()), &accounts);
        // Key order and spacing differ from what serde_json would produce.
        let body = r#"{"id":"WH-1", "event_version":"1.0","event_type":"PAYMENT.SALE.COMPLETED","create_time":"2024-03-01T12:00:00Z","resource":{"payer_email":"a@x.com","id":"S-1"}}"#;

        handler
            .handle(HandlePayPalWebhookCommand {
                payload: body.as_bytes().to_vec(),
                transmission: headers(),
            })
            .await
            .unwrap();

        assert_eq!(gateway.verify_requests()[0].webhook_event.get(), body);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let accounts = InMemoryAccountRepository::new();
        let gateway = MockPayPalGateway::new();
        let handler = handler(Some(gateway.clone()), &accounts);

        let err = handler
            .handle(HandlePayPalWebhookCommand {
                payload: b"{not json".to_vec(),
                transmission: headers(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::ParseError(_)));
        assert!(gateway.verify_requests().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Dispatch
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn payment_failure_requires_matching_subscription() {
        let accounts = InMemoryAccountRepository::new();
        accounts.seed(account("a@x.com", Some("I-OTHER"))).await;
        let before = accounts.all().await;
        let handler = handler(Some(MockPayPalGateway::new()), &accounts);

        let outcome = handler.handle(delivery(payment_failed("I-1"))).await.unwrap();

        assert_eq!(outcome, WebhookOutcome::Unmatched);
        assert_eq!(accounts.all().await, before);
    }

    #[tokio::test]
    async fn payment_failure_marks_matching_account_past_due() {
        let accounts = InMemoryAccountRepository::new();
        accounts.seed(account("a@x.com", Some("I-1"))).await;
        let handler = handler(Some(MockPayPalGateway::new()), &accounts);

        handler.handle(delivery(payment_failed("I-1"))).await.unwrap();

        assert!(accounts.all().await[0].past_due);
    }

    #[tokio::test]
    async fn subscription_update_links_account_by_email() {
        let accounts = InMemoryAccountRepository::new();
        accounts.seed(account("a@x.com", None)).await;
        let handler = handler(Some(MockPayPalGateway::new()), &accounts);
        let payload = serde_json::json!({
            "id": "WH-2",
            "event_type": "BILLING.SUBSCRIPTION.UPDATED",
            "create_time": "2024-03-01T12:00:00Z",
            "resource": {
                "id": "I-9",
                "status": "ACTIVE",
                "plan_id": "P-1",
                "subscriber": { "email_address": "A@X.com" }
            }
        });

        handler.handle(delivery(payload)).await.unwrap();

        let acct = &accounts.all().await[0];
        assert_eq!(acct.paypal_subscription_id.as_deref(), Some("I-9"));
        assert_eq!(acct.subscription_status.as_deref(), Some("ACTIVE"));
        assert_eq!(acct.stripe_price_id.as_deref(), Some("P-1"));
    }
}
