//! CreateSubscriptionHandler - subscribes a customer with a saved card.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, CreateSubscriptionRequest, StripeGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub email: Email,
    pub price_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscriptionResult {
    pub subscription_id: String,
    pub status: String,
    /// Client secret of the first invoice's payment intent, for 3DS.
    pub client_secret: Option<String>,
}

/// Handler for creating Stripe subscriptions.
///
/// The first invoice is paid immediately: a payment intent that comes back
/// `requires_confirmation` is confirmed before returning.
pub struct CreateSubscriptionHandler {
    accounts: Arc<dyn AccountRepository>,
    stripe: Arc<dyn StripeGateway>,
}

impl CreateSubscriptionHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, stripe: Arc<dyn StripeGateway>) -> Self {
        Self { accounts, stripe }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;
        let customer_id = account.stripe_customer_id.ok_or_else(|| {
            BillingError::precondition("Customer not found. Please save a payment method first.")
        })?;
        let payment_method = account.stripe_default_payment_method_id.ok_or_else(|| {
            BillingError::precondition("No payment method found. Please save a card first.")
        })?;

        let subscription = self
            .stripe
            .create_subscription(CreateSubscriptionRequest {
                customer_id: customer_id.clone(),
                price_id: cmd.price_id.clone(),
                default_payment_method: payment_method,
            })
            .await?;
        tracing::info!(
            account_id = %account.id,
            customer_id = %customer_id,
            subscription_id = %subscription.id,
            "Created subscription"
        );

        if let Some(pi) = subscription
            .latest_payment_intent
            .as_ref()
            .filter(|pi| pi.requires_confirmation())
        {
            self.stripe.confirm_payment_intent(&pi.id).await?;
            tracing::info!(
                payment_intent_id = %pi.id,
                subscription_id = %subscription.id,
                "Confirmed first payment"
            );
        }

        let mut patch = BillingPatch::command().with_status(subscription.status.clone());
        patch.stripe_subscription_id = Some(subscription.id.clone());
        patch.stripe_price_id = Some(cmd.price_id);
        self.accounts
            .apply_patch(&AccountSelector::Id(account.id), &patch)
            .await?;

        Ok(CreateSubscriptionResult {
            client_secret: subscription
                .latest_payment_intent
                .and_then(|pi| pi.client_secret),
            subscription_id: subscription.id,
            status: subscription.status,
        })
    }
}
