//! GetBillingHistoryHandler - query for a customer's trailing-year transactions.

use std::sync::Arc;

use crate::domain::billing::{
    BillingError, BillingHistory, HISTORY_PAGE_LIMIT, HISTORY_WINDOW_DAYS,
};
use crate::domain::foundation::{Email, Timestamp};
use crate::ports::{AccountRepository, StripeGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct GetBillingHistoryQuery {
    pub email: Email,
}

/// Handler for billing history.
///
/// The three Stripe listings are fetched concurrently; any one failing fails
/// the query.
pub struct GetBillingHistoryHandler {
    accounts: Arc<dyn AccountRepository>,
    stripe: Arc<dyn StripeGateway>,
}

impl GetBillingHistoryHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, stripe: Arc<dyn StripeGateway>) -> Self {
        Self { accounts, stripe }
    }

    pub async fn handle(&self, query: GetBillingHistoryQuery) -> Result<BillingHistory, BillingError> {
        let account = account_by_email(self.accounts.as_ref(), &query.email).await?;
        let customer_id = account
            .stripe_customer_id
            .ok_or_else(|| BillingError::precondition("No Stripe customer found."))?;

        let since = Timestamp::now().minus_days(HISTORY_WINDOW_DAYS);
        let (invoices, payment_intents, charges) = tokio::try_join!(
            self.stripe.list_invoices(&customer_id, since, HISTORY_PAGE_LIMIT),
            self.stripe.list_payment_intents(&customer_id, since, HISTORY_PAGE_LIMIT),
            self.stripe.list_charges(&customer_id, since, HISTORY_PAGE_LIMIT),
        )?;

        Ok(BillingHistory::assemble(&invoices, &payment_intents, &charges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockStripeGateway;
    use crate::application::handlers::test_support::{account, email, store_with};
    use crate::domain::billing::{InvoiceRecord, PaymentIntentRecord};
    use crate::ports::GatewayError;

    fn customer() -> crate::domain::account::Account {
        let mut acct = account("a@x.com");
        acct.stripe_customer_id = Some("cus_1".to_string());
        acct
    }

    fn query() -> GetBillingHistoryQuery {
        GetBillingHistoryQuery {
            email: email("a@x.com"),
        }
    }

    #[tokio::test]
    async fn merges_listings_and_requests_full_pages() {
        let (_, accounts) = store_with(vec![customer()]).await;
        let stripe = MockStripeGateway::new();
        stripe.set_history(
            vec![InvoiceRecord {
                id: "in_1".to_string(),
                number: Some("A-0001".to_string()),
                amount_paid: 1999,
                currency: "usd".to_string(),
                status: Some("paid".to_string()),
                created: 1_700_000_000,
                period_start: None,
                period_end: None,
                description: None,
                line_description: None,
                hosted_invoice_url: None,
                invoice_pdf: None,
                payment_intent: Some("pi_1".to_string()),
                charge: None,
            }],
            vec![PaymentIntentRecord {
                id: "pi_1".to_string(),
                amount: 1999,
                currency: "usd".to_string(),
                status: "succeeded".to_string(),
                created: 1_700_000_000,
                description: None,
            }],
            vec![],
        );
        let handler = GetBillingHistoryHandler::new(accounts, Arc::new(stripe.clone()));

        let history = handler.handle(query()).await.unwrap();

        assert_eq!(history.count, 1);
        assert_eq!(history.total_amount, 19.99);
        assert_eq!(
            stripe.last_call("list_charges"),
            Some(vec!["cus_1".to_string(), "100".to_string()])
        );
    }

    #[tokio::test]
    async fn requires_customer() {
        let (_, accounts) = store_with(vec![account("a@x.com")]).await;
        let handler = GetBillingHistoryHandler::new(accounts, Arc::new(MockStripeGateway::new()));

        let err = handler.handle(query()).await.unwrap_err();

        assert_eq!(err, BillingError::Precondition("No Stripe customer found.".into()));
    }

    #[tokio::test]
    async fn any_listing_failure_fails_the_query() {
        let (_, accounts) = store_with(vec![customer()]).await;
        let stripe = MockStripeGateway::new();
        stripe.set_method_error("list_payment_intents", GatewayError::provider("rate limited"));
        let handler = GetBillingHistoryHandler::new(accounts, Arc::new(stripe));

        let err = handler.handle(query()).await.unwrap_err();

        assert_eq!(err, BillingError::Processor("rate limited".into()));
    }
}
