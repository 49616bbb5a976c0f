//! GetSubscriptionHandler - the account's mirrored plan and billing state.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::AccountRepository;

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub email: Email,
}

/// Billing state as stored locally; no processor call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub plan: String,
    pub past_due: bool,
    pub card_last4: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub stripe_price_id: Option<String>,
}

pub struct GetSubscriptionHandler {
    accounts: Arc<dyn AccountRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<SubscriptionView, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &query.email).await?;
        Ok(SubscriptionView {
            plan: account.plan,
            past_due: account.past_due,
            card_last4: account.card_last4,
            stripe_subscription_id: account.stripe_subscription_id,
            subscription_status: account.subscription_status,
            stripe_price_id: account.stripe_price_id,
        })
    }
}
