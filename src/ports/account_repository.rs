//! AccountRepository port - the accounts store.

use async_trait::async_trait;

use crate::domain::account::{
    Account, AccountSelector, BillingPatch, NewAccount, PatchOutcome,
};
use crate::domain::foundation::DomainError;

/// Persistence for account rows.
///
/// Every mutation is a single atomic statement; nothing here spans requests.
/// Implementations report an unreachable store with
/// `ErrorCode::StorageUnavailable` so callers can tell "retry later" apart
/// from a failed query.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account. Returns `None` when the email is already taken.
    async fn insert(&self, account: NewAccount) -> Result<Option<Account>, DomainError>;

    /// Finds the first account matching the selector.
    async fn find(&self, selector: &AccountSelector) -> Result<Option<Account>, DomainError>;

    /// Applies a patch to every matching row.
    ///
    /// Zero matched rows is a normal outcome, not an error.
    async fn apply_patch(
        &self,
        selector: &AccountSelector,
        patch: &BillingPatch,
    ) -> Result<PatchOutcome, DomainError>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), DomainError>;
}
