//! Fixtures shared by handler tests.

use std::sync::Arc;

use crate::adapters::memory::InMemoryAccountRepository;
use crate::domain::account::{Account, NewAccount};
use crate::domain::foundation::Email;
use crate::ports::AccountRepository;

pub(crate) fn email(raw: &str) -> Email {
    Email::new(raw).unwrap()
}

pub(crate) fn account(raw_email: &str) -> Account {
    Account::register(NewAccount {
        email: email(raw_email),
        password_hash: "hash".to_string(),
        plan: "basic".to_string(),
        card_last4: None,
        card_on_file: Default::default(),
    })
}

/// A store holding `accounts`, plus the same store as a port object.
pub(crate) async fn store_with(
    accounts: Vec<Account>,
) -> (InMemoryAccountRepository, Arc<dyn AccountRepository>) {
    let repo = InMemoryAccountRepository::new();
    for acct in accounts {
        repo.seed(acct).await;
    }
    let port: Arc<dyn AccountRepository> = Arc::new(repo.clone());
    (repo, port)
}
