//! CreateSetupIntentHandler - prepares a customer to save a card.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, StripeGateway};

use super::super::lookup::account_by_email;

/// Command to create a setup intent for off-session card use.
#[derive(Debug, Clone)]
pub struct CreateSetupIntentCommand {
    pub email: Email,
    /// Plan the user is shopping for; informational only.
    pub plan: Option<String>,
    /// Price to remember for the later subscription.
    pub price_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSetupIntentResult {
    pub client_secret: String,
    pub customer_id: String,
}

/// Handler for creating setup intents.
///
/// Creates the Stripe customer on first use and persists its id before the
/// setup intent is requested, so a failed intent never orphans a customer.
pub struct CreateSetupIntentHandler {
    accounts: Arc<dyn AccountRepository>,
    stripe: Arc<dyn StripeGateway>,
}

impl CreateSetupIntentHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, stripe: Arc<dyn StripeGateway>) -> Self {
        Self { accounts, stripe }
    }

    pub async fn handle(
        &self,
        cmd: CreateSetupIntentCommand,
    ) -> Result<CreateSetupIntentResult, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;
        let selector = AccountSelector::Id(account.id);

        let mut patch = BillingPatch::command();
        let customer_id = match account.stripe_customer_id {
            Some(id) => id,
            None => {
                let customer = self.stripe.create_customer(account.email.as_str()).await?;
                tracing::info!(
                    account_id = %account.id,
                    customer_id = %customer.id,
                    "Created Stripe customer"
                );
                patch.stripe_customer_id = Some(customer.id.clone());
                customer.id
            }
        };
        patch.stripe_price_id = cmd.price_id;

        if !patch.is_empty() {
            self.accounts.apply_patch(&selector, &patch).await?;
        }

        let setup_intent = self.stripe.create_setup_intent(&customer_id).await?;
        let client_secret = setup_intent
            .client_secret
            .ok_or_else(|| BillingError::processor("Failed to create SetupIntent client secret"))?;

        tracing::info!(
            account_id = %account.id,
            customer_id = %customer_id,
            plan = cmd.plan.as_deref().unwrap_or("-"),
            "Created setup intent"
        );

        Ok(CreateSetupIntentResult {
            client_secret,
            customer_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockStripeGateway;
    use crate::application::handlers::test_support::{account, email, store_with};
    use crate::ports::GatewayError;

    fn command(price_id: Option<&str>) -> CreateSetupIntentCommand {
        CreateSetupIntentCommand {
            email: email("a@x.com"),
            plan: Some("pro".to_string()),
            price_id: price_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn creates_and_persists_customer_on_first_use() {
        let (repo, accounts) = store_with(vec![account("a@x.com")]).await;
        let stripe = MockStripeGateway::new();
        let handler = CreateSetupIntentHandler::new(accounts, Arc::new(stripe.clone()));

        let result = handler.handle(command(Some("price_pro"))).await.unwrap();

        assert!(result.customer_id.starts_with("cus_"));
        assert!(!result.client_secret.is_empty());
        let stored = &repo.all().await[0];
        assert_eq!(stored.stripe_customer_id.as_deref(), Some(result.customer_id.as_str()));
        assert_eq!(stored.stripe_price_id.as_deref(), Some("price_pro"));
        assert_eq!(stripe.last_call("create_setup_intent"), Some(vec![result.customer_id]));
    }

    #[tokio::test]
    async fn reuses_existing_customer() {
        let mut acct = account("a@x.com");
        acct.stripe_customer_id = Some("cus_existing".to_string());
        let (_, accounts) = store_with(vec![acct]).await;
        let stripe = MockStripeGateway::new();
        let handler = CreateSetupIntentHandler::new(accounts, Arc::new(stripe.clone()));

        let result = handler.handle(command(None)).await.unwrap();

        assert_eq!(result.customer_id, "cus_existing");
        assert!(!stripe.was_called("create_customer"));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let (_, accounts) = store_with(vec![]).await;
        let handler = CreateSetupIntentHandler::new(accounts, Arc::new(MockStripeGateway::new()));

        let err = handler.handle(command(None)).await.unwrap_err();

        assert_eq!(err, BillingError::AccountNotFound);
    }

    #[tokio::test]
    async fn missing_client_secret_is_a_processor_failure() {
        let (_, accounts) = store_with(vec![account("a@x.com")]).await;
        let stripe = MockStripeGateway::new();
        stripe.omit_setup_intent_client_secret();
        let handler = CreateSetupIntentHandler::new(accounts, Arc::new(stripe));

        let err = handler.handle(command(None)).await.unwrap_err();

        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn processor_error_message_is_surfaced() {
        let (_, accounts) = store_with(vec![account("a@x.com")]).await;
        let stripe = MockStripeGateway::new();
        stripe.set_method_error("create_customer", GatewayError::provider("Invalid API Key provided"));
        let handler = CreateSetupIntentHandler::new(accounts, Arc::new(stripe));

        let err = handler.handle(command(None)).await.unwrap_err();

        assert_eq!(err, BillingError::Processor("Invalid API Key provided".into()));
    }

    #[tokio::test]
    async fn unavailable_store_is_distinguished() {
        let (repo, accounts) = store_with(vec![account("a@x.com")]).await;
        repo.set_unavailable(true);
        let handler = CreateSetupIntentHandler::new(accounts, Arc::new(MockStripeGateway::new()));

        let err = handler.handle(command(None)).await.unwrap_err();

        assert_eq!(err, BillingError::StorageUnavailable);
    }
}
