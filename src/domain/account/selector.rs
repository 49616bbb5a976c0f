//! Correlation keys that map a command or webhook back to account rows.

use std::fmt;

use crate::domain::foundation::{AccountId, Email};

use super::Account;

/// Which account rows a lookup or patch targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSelector {
    Id(AccountId),
    Email(Email),
    /// Stripe webhooks correlate by customer id.
    StripeCustomer(String),
    /// PayPal subscription events that must match both the subscriber email
    /// and the subscription id already on file.
    PayPalSubscriber { email: Email, subscription_id: String },
}

impl AccountSelector {
    pub fn matches(&self, account: &Account) -> bool {
        match self {
            AccountSelector::Id(id) => account.id == *id,
            AccountSelector::Email(email) => account.email == *email,
            AccountSelector::StripeCustomer(customer) => {
                account.stripe_customer_id.as_deref() == Some(customer.as_str())
            }
            AccountSelector::PayPalSubscriber {
                email,
                subscription_id,
            } => {
                account.email == *email
                    && account.paypal_subscription_id.as_deref() == Some(subscription_id.as_str())
            }
        }
    }
}

impl fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSelector::Id(id) => write!(f, "id={}", id),
            AccountSelector::Email(email) => write!(f, "email={}", email),
            AccountSelector::StripeCustomer(customer) => write!(f, "stripe_customer={}", customer),
            AccountSelector::PayPalSubscriber {
                email,
                subscription_id,
            } => write!(f, "email={} paypal_subscription={}", email, subscription_id),
        }
    }
}
