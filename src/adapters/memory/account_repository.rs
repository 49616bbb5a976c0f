//! In-memory AccountRepository.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{
    Account, AccountSelector, BillingPatch, NewAccount, PatchOutcome,
};
use crate::domain::foundation::DomainError;
use crate::ports::AccountRepository;

/// Account rows held in a vector behind an async lock.
///
/// Patches go through [`Account::apply`], the same rules the SQL statement
/// encodes, so tests against this store exercise real semantics.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<Vec<Account>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a fully-formed row, bypassing the uniqueness check.
    pub async fn seed(&self, account: Account) {
        self.accounts.write().await.push(account);
    }

    /// Makes every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all rows, for assertions.
    pub async fn all(&self) -> Vec<Account> {
        self.accounts.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::unavailable("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, new: NewAccount) -> Result<Option<Account>, DomainError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == new.email) {
            return Ok(None);
        }
        let account = Account::register(new);
        accounts.push(account.clone());
        Ok(Some(account))
    }

    async fn find(&self, selector: &AccountSelector) -> Result<Option<Account>, DomainError> {
        self.check_available()?;
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| selector.matches(a)).cloned())
    }

    async fn apply_patch(
        &self,
        selector: &AccountSelector,
        patch: &BillingPatch,
    ) -> Result<PatchOutcome, DomainError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        let mut outcome = PatchOutcome::no_match();
        for account in accounts.iter_mut().filter(|a| selector.matches(a)) {
            outcome.record(account.apply(patch));
        }
        Ok(outcome)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check_available()
    }
}
