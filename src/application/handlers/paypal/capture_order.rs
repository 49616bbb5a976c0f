//! CaptureOrderHandler - captures an approved order and links the payer.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, PayPalGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct CaptureOrderCommand {
    pub email: Email,
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOrderResult {
    pub order_id: String,
    pub status: String,
    pub payer_id: Option<String>,
    pub amount: Option<String>,
}

/// Handler for capturing PayPal orders.
///
/// A capture that does not come back `COMPLETED` is reported as
/// [`BillingError::CaptureIncomplete`] and nothing is persisted.
pub struct CaptureOrderHandler {
    accounts: Arc<dyn AccountRepository>,
    paypal: Arc<dyn PayPalGateway>,
}

impl CaptureOrderHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, paypal: Arc<dyn PayPalGateway>) -> Self {
        Self { accounts, paypal }
    }

    pub async fn handle(&self, cmd: CaptureOrderCommand) -> Result<CaptureOrderResult, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;

        let capture = self.paypal.capture_order(&cmd.order_id).await?;
        if !capture.is_completed() {
            tracing::warn!(
                account_id = %account.id,
                order_id = %cmd.order_id,
                status = %capture.status,
                "PayPal order capture did not complete"
            );
            return Err(BillingError::CaptureIncomplete {
                status: capture.status,
            });
        }

        if let Some(payer_id) = &capture.payer_id {
            let mut patch = BillingPatch::command();
            patch.paypal_payer_id = Some(payer_id.clone());
            self.accounts
                .apply_patch(&AccountSelector::Id(account.id), &patch)
                .await?;
        }

        tracing::info!(account_id = %account.id, order_id = %capture.id, "Captured PayPal order");

        Ok(CaptureOrderResult {
            order_id: capture.id,
            status: capture.status,
            payer_id: capture.payer_id,
            amount: capture.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::paypal::MockPayPalGateway;
    use crate::application::handlers::test_support::{account, email, store_with};

    fn command() -> CaptureOrderCommand {
        CaptureOrderCommand {
            email: email("a@x.com"),
            order_id: "ORDER-1".to_string(),
        }
    }

    #[tokio::test]
    async fn completed_capture_links_payer() {
        let (repo, accounts) = store_with(vec![account("a@x.com")]).await;
        let handler = CaptureOrderHandler::new(accounts, Arc::new(MockPayPalGateway::new()));

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.status, "COMPLETED");
        assert_eq!(result.payer_id.as_deref(), Some("PAYER-MOCK"));
        assert_eq!(repo.all().await[0].paypal_payer_id.as_deref(), Some("PAYER-MOCK"));
    }

    #[tokio::test]
    async fn incomplete_capture_persists_nothing() {
        let (repo, accounts) = store_with(vec![account("a@x.com")]).await;
        let paypal = MockPayPalGateway::new();
        paypal.set_capture_result("PENDING", Some("PAYER-1"));
        let handler = CaptureOrderHandler::new(accounts, Arc::new(paypal));

        let err = handler.handle(command()).await.unwrap_err();

        assert_eq!(err, BillingError::CaptureIncomplete { status: "PENDING".into() });
        assert!(repo.all().await[0].paypal_payer_id.is_none());
    }
}
