//! SavePaymentMethodHandler - makes a confirmed card the customer's default.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, StripeGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct SavePaymentMethodCommand {
    pub email: Email,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePaymentMethodResult {
    pub payment_method_id: String,
    pub card_last4: Option<String>,
}

pub struct SavePaymentMethodHandler {
    accounts: Arc<dyn AccountRepository>,
    stripe: Arc<dyn StripeGateway>,
}

impl SavePaymentMethodHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, stripe: Arc<dyn StripeGateway>) -> Self {
        Self { accounts, stripe }
    }

    pub async fn handle(
        &self,
        cmd: SavePaymentMethodCommand,
    ) -> Result<SavePaymentMethodResult, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;
        let customer_id = account.stripe_customer_id.ok_or_else(|| {
            BillingError::precondition("Customer not found. Please create a setup intent first.")
        })?;

        let payment_method = self
            .stripe
            .retrieve_payment_method(&cmd.payment_method_id)
            .await?;
        if !payment_method.is_attached_to(&customer_id) {
            self.stripe
                .attach_payment_method(&cmd.payment_method_id, &customer_id)
                .await?;
        }
        self.stripe
            .set_default_payment_method(&customer_id, &cmd.payment_method_id)
            .await?;

        let card_last4 = payment_method.card_last4;
        let patch = BillingPatch::command()
            .with_default_payment_method(cmd.payment_method_id.clone(), card_last4.clone());
        self.accounts
            .apply_patch(&AccountSelector::Id(account.id), &patch)
            .await?;

        tracing::info!(
            account_id = %account.id,
            customer_id = %customer_id,
            payment_method_id = %cmd.payment_method_id,
            "Saved default payment method"
        );

        Ok(SavePaymentMethodResult {
            payment_method_id: cmd.payment_method_id,
            card_last4,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockStripeGateway;
    use crate::application::handlers::test_support::{account, email, store_with};

    fn command(pm: &str) -> SavePaymentMethodCommand {
        SavePaymentMethodCommand {
            email: email("a@x.com"),
            payment_method_id: pm.to_string(),
        }
    }

    fn linked_account() -> crate::domain::account::Account {
        let mut acct = account("a@x.com");
        acct.stripe_customer_id = Some("cus_1".to_string());
        acct
    }

    #[tokio::test]
    async fn attaches_sets_default_and_persists_last4() {
        let (repo, accounts) = store_with(vec![linked_account()]).await;
        let stripe = MockStripeGateway::new();
        stripe.add_payment_method("pm_visa", Some("4242"));
        let handler = SavePaymentMethodHandler::new(accounts, Arc::new(stripe.clone()));

        let result = handler.handle(command("pm_visa")).await.unwrap();

        assert_eq!(result.card_last4.as_deref(), Some("4242"));
        assert_eq!(
            stripe.last_call("attach_payment_method"),
            Some(vec!["pm_visa".to_string(), "cus_1".to_string()])
        );
        assert_eq!(
            stripe.last_call("set_default_payment_method"),
            Some(vec!["cus_1".to_string(), "pm_visa".to_string()])
        );
        let stored = &repo.all().await[0];
        assert_eq!(stored.card_last4.as_deref(), Some("4242"));
        assert_eq!(stored.stripe_default_payment_method_id.as_deref(), Some("pm_visa"));
    }

    #[tokio::test]
    async fn already_attached_method_is_not_reattached() {
        let (_, accounts) = store_with(vec![linked_account()]).await;
        let stripe = MockStripeGateway::new();
        stripe.add_payment_method("pm_visa", Some("4242"));
        stripe.attach_payment_method("pm_visa", "cus_1").await.unwrap();
        let handler = SavePaymentMethodHandler::new(accounts, Arc::new(stripe.clone()));

        handler.handle(command("pm_visa")).await.unwrap();

        assert_eq!(stripe.call_count("attach_payment_method"), 1);
    }

    #[tokio::test]
    async fn card_without_last4_keeps_stored_value() {
        let mut acct = linked_account();
        acct.card_last4 = Some("1881".to_string());
        let (repo, accounts) = store_with(vec![acct]).await;
        let stripe = MockStripeGateway::new();
        stripe.add_payment_method("pm_bank", None);
        let handler = SavePaymentMethodHandler::new(accounts, Arc::new(stripe));

        handler.handle(command("pm_bank")).await.unwrap();

        let stored = &repo.all().await[0];
        assert_eq!(stored.card_last4.as_deref(), Some("1881"));
        assert_eq!(stored.stripe_default_payment_method_id.as_deref(), Some("pm_bank"));
    }

    #[tokio::test]
    async fn requires_customer_first() {
        let (_, accounts) = store_with(vec![account("a@x.com")]).await;
        let handler = SavePaymentMethodHandler::new(accounts, Arc::new(MockStripeGateway::new()));

        let err = handler.handle(command("pm_visa")).await.unwrap_err();

        assert_eq!(
            err,
            BillingError::Precondition("Customer not found. Please create a setup intent first.".into())
        );
    }

    #[tokio::test]
    async fn unknown_payment_method_is_processor_error() {
        let (_, accounts) = store_with(vec![linked_account()]).await;
        let handler = SavePaymentMethodHandler::new(accounts, Arc::new(MockStripeGateway::new()));

        let err = handler.handle(command("pm_missing")).await.unwrap_err();

        assert!(matches!(err, BillingError::Processor(msg) if msg.contains("pm_missing")));
    }
}
