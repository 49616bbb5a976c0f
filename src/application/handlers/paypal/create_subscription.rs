//! CreatePayPalSubscriptionHandler - starts a PayPal subscription for approval.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, CreatePayPalSubscriptionRequest, Link, PayPalGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct CreatePayPalSubscriptionCommand {
    pub email: Email,
    pub plan_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePayPalSubscriptionResult {
    pub subscription_id: String,
    pub status: String,
    /// Includes the `approve` link the browser must follow.
    pub links: Vec<Link>,
}

pub struct CreatePayPalSubscriptionHandler {
    accounts: Arc<dyn AccountRepository>,
    paypal: Arc<dyn PayPalGateway>,
    frontend_url: String,
}

impl CreatePayPalSubscriptionHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        paypal: Arc<dyn PayPalGateway>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            paypal,
            frontend_url: frontend_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePayPalSubscriptionCommand,
    ) -> Result<CreatePayPalSubscriptionResult, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;

        let subscription = self
            .paypal
            .create_subscription(CreatePayPalSubscriptionRequest {
                plan_id: cmd.plan_id,
                subscriber_email: account.email.to_string(),
                return_url: format!("{}/paypal/subscription/return", self.frontend_url),
                cancel_url: format!("{}/paypal/subscription/cancel", self.frontend_url),
            })
            .await?;
        if subscription.id.is_empty() {
            return Err(BillingError::processor("Failed to create PayPal subscription"));
        }

        let mut patch = BillingPatch::command();
        patch.paypal_subscription_id = Some(subscription.id.clone());
        self.accounts
            .apply_patch(&AccountSelector::Id(account.id), &patch)
            .await?;

        tracing::info!(
            account_id = %account.id,
            subscription_id = %subscription.id,
            "Created PayPal subscription"
        );

        Ok(CreatePayPalSubscriptionResult {
            subscription_id: subscription.id,
            status: subscription.status,
            links: subscription.links,
        })
    }
}
