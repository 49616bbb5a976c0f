//! CancelPayPalSubscriptionHandler - cancels at PayPal and unlinks locally.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, PayPalGateway};

use super::super::lookup::account_by_email;

const DEFAULT_REASON: &str = "User requested cancellation";

#[derive(Debug, Clone)]
pub struct CancelPayPalSubscriptionCommand {
    pub email: Email,
    pub reason: Option<String>,
}

pub struct CancelPayPalSubscriptionHandler {
    accounts: Arc<dyn AccountRepository>,
    paypal: Arc<dyn PayPalGateway>,
}

impl CancelPayPalSubscriptionHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, paypal: Arc<dyn PayPalGateway>) -> Self {
        Self { accounts, paypal }
    }

    pub async fn handle(&self, cmd: CancelPayPalSubscriptionCommand) -> Result<(), BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;
        let subscription_id = account
            .paypal_subscription_id
            .ok_or_else(|| BillingError::precondition("No active PayPal subscription found"))?;

        let reason = cmd
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REASON.to_string());
        self.paypal
            .cancel_subscription(&subscription_id, &reason)
            .await?;

        let mut patch = BillingPatch::command().with_status("cancelled");
        patch.clear_paypal_subscription_id = true;
        self.accounts
            .apply_patch(&AccountSelector::Id(account.id), &patch)
            .await?;

        tracing::info!(
            account_id = %account.id,
            subscription_id = %subscription_id,
            "Cancelled PayPal subscription"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::paypal::MockPayPalGateway;
    use crate::application::handlers::test_support::{account, email, store_with};
    use crate::ports::GatewayError;

    fn command(reason: Option<&str>) -> CancelPayPalSubscriptionCommand {
        CancelPayPalSubscriptionCommand {
            email: email("a@x.com"),
            reason: reason.map(str::to_string),
        }
    }

    fn subscribed() -> crate::domain::account::Account {
        let mut acct = account("a@x.com");
        acct.paypal_subscription_id = Some("I-1".to_string());
        acct.subscription_status = Some("ACTIVE".to_string());
        acct
    }

    #[tokio::test]
    async fn cancels_and_unlinks() {
        let (repo, accounts) = store_with(vec![subscribed()]).await;
        let paypal = MockPayPalGateway::new();
        let handler = CancelPayPalSubscriptionHandler::new(accounts, Arc::new(paypal.clone()));

        handler.handle(command(None)).await.unwrap();

        assert_eq!(
            paypal.last_call("cancel_subscription"),
            Some(vec!["I-1".to_string(), DEFAULT_REASON.to_string()])
        );
        let stored = &repo.all().await[0];
        assert!(stored.paypal_subscription_id.is_none());
        assert_eq!(stored.subscription_status.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn custom_reason_is_forwarded() {
        let (_, accounts) = store_with(vec![subscribed()]).await;
        let paypal = MockPayPalGateway::new();
        let handler = CancelPayPalSubscriptionHandler::new(accounts, Arc::new(paypal.clone()));

        handler.handle(command(Some("Too expensive"))).await.unwrap();

        assert_eq!(
            paypal.last_call("cancel_subscription"),
            Some(vec!["I-1".to_string(), "Too expensive".to_string()])
        );
    }

    #[tokio::test]
    async fn requires_linked_subscription() {
        let (_, accounts) = store_with(vec![account("a@x.com")]).await;
        let handler =
            CancelPayPalSubscriptionHandler::new(accounts, Arc::new(MockPayPalGateway::new()));

        let err = handler.handle(command(None)).await.unwrap_err();

        assert_eq!(err, BillingError::Precondition("No active PayPal subscription found".into()));
    }

    #[tokio::test]
    async fn processor_failure_keeps_link() {
        let (repo, accounts) = store_with(vec![subscribed()]).await;
        let paypal = MockPayPalGateway::new();
        paypal.set_method_error("cancel_subscription", GatewayError::provider("RESOURCE_NOT_FOUND"));
        let handler = CancelPayPalSubscriptionHandler::new(accounts, Arc::new(paypal));

        let err = handler.handle(command(None)).await.unwrap_err();

        assert!(err.is_server_error());
        assert_eq!(repo.all().await[0].paypal_subscription_id.as_deref(), Some("I-1"));
    }
}
