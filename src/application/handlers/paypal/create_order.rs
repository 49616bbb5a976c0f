//! CreateOrderHandler - one-time PayPal checkout order.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, CreateOrderRequest, Link, PayPalGateway};

use super::super::lookup::account_by_email;

#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub email: Email,
    /// Major currency units; must be positive.
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderResult {
    pub order_id: String,
    pub status: String,
    pub links: Vec<Link>,
}

pub struct CreateOrderHandler {
    accounts: Arc<dyn AccountRepository>,
    paypal: Arc<dyn PayPalGateway>,
    frontend_url: String,
}

impl CreateOrderHandler {
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

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, BillingError> {
        if !cmd.amount.is_finite() || cmd.amount <= 0.0 {
            return Err(BillingError::validation("amount", "Amount must be positive"));
        }
        let account = account_by_email(self.accounts.as_ref(), &cmd.email).await?;

        let order = self
            .paypal
            .create_order(CreateOrderRequest {
                amount: format!("{:.2}", cmd.amount),
                currency: cmd.currency,
                description: cmd.description,
                return_url: format!("{}/paypal/return", self.frontend_url),
                cancel_url: format!("{}/paypal/cancel", self.frontend_url),
            })
            .await?;

        tracing::info!(account_id = %account.id, order_id = %order.id, "Created PayPal order");

        Ok(CreateOrderResult {
            order_id: order.id,
            status: order.status,
            links: order.links,
        })
    }
}
