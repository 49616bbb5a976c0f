//! CancelSubscriptionHandler - cancels a Stripe subscription now or at period end.

use std::sync::Arc;

use crate::domain::account::{AccountSelector, BillingPatch};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, StripeGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub email: Email,
    /// End access now instead of at the end of the paid period.
    pub cancel_immediately: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelSubscriptionResult {
    pub subscription_id: String,
    /// Status as Stripe reports it; stays `active` until period end when
    /// cancelling at period end.
    pub status: String,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub current_period_end: Option<i64>,
}

pub struct CancelSubscriptionHandler {
    accounts: Arc<dyn AccountRepository>,
    stripe: Arc<dyn StripeGateway>,
}

impl CancelSubscriptionHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, stripe: Arc<dyn StripeGateway>) -> Self {
        Self { accounts, stripe }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;
        let subscription_id = account
            .stripe_subscription_id
            .ok_or_else(|| BillingError::precondition("No active subscription found."))?;

        let at_period_end = !cmd.cancel_immediately;
        let subscription = self
            .stripe
            .cancel_subscription(&subscription_id, at_period_end)
            .await?;

        let patch = BillingPatch::command().with_status(subscription.status.clone());
        self.accounts
            .apply_patch(&AccountSelector::Id(account.id), &patch)
            .await?;

        tracing::info!(
            account_id = %account.id,
            subscription_id = %subscription.id,
            immediately = cmd.cancel_immediately,
            status = %subscription.status,
            "Cancelled subscription"
        );

        Ok(CancelSubscriptionResult {
            subscription_id: subscription.id,
            status: subscription.status,
            cancel_at_period_end: subscription.cancel_at_period_end,
            canceled_at: subscription.canceled_at,
            current_period_end: subscription.current_period_end,
        })
    }
}
