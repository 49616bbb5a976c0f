//! Account resolution shared by the billing and PayPal commands.

use crate::domain::account::{Account, AccountSelector};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Email;
use crate::ports::AccountRepository;

/// Resolves the account a command acts on, or `AccountNotFound`.
pub(crate) async fn account_by_email(
    accounts: &dyn AccountRepository,
    email: &Email,
) -> Result<Account, BillingError> {
    accounts
        .find(&AccountSelector::Email(email.clone()))
        .await?
        .ok_or(BillingError::AccountNotFound)
}
