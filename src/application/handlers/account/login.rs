//! LoginHandler - checks credentials against the stored hash.

use std::sync::Arc;

use crate::domain::account::{AccountError, AccountSelector, AccountSummary};
use crate::domain::foundation::Email;
use crate::ports::{AccountRepository, PasswordHasher};

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Unknown email, malformed email and wrong password all answer
/// [`AccountError::InvalidCredentials`].
pub struct LoginHandler {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl LoginHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { accounts, hasher }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<AccountSummary, AccountError> {
        let email = Email::new(&cmd.email).map_err(|_| AccountError::InvalidCredentials)?;
        let account = self
            .accounts
            .find(&AccountSelector::Email(email))
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !self.hasher.verify(&cmd.password, &account.password_hash) {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(AccountSummary::from(&account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::Argon2PasswordHasher;
    use crate::application::handlers::account::{RegisterCommand, RegisterHandler};
    use crate::application::handlers::test_support::store_with;

    async fn registered() -> LoginHandler {
        let (_, accounts) = store_with(vec![]).await;
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
        RegisterHandler::new(accounts.clone(), hasher.clone())
            .handle(RegisterCommand {
                email: "a@x.com".to_string(),
                password: "correct-horse".to_string(),
                plan: "pro".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        LoginHandler::new(accounts, hasher)
    }

    fn login(email: &str, password: &str) -> LoginCommand {
        LoginCommand {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn correct_password_returns_summary() {
        let handler = registered().await;
        let summary = handler.handle(login("A@x.com", "correct-horse")).await.unwrap();
        assert_eq!(summary.plan, "pro");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let handler = registered().await;

        let wrong = handler.handle(login("a@x.com", "battery-staple")).await.unwrap_err();
        let unknown = handler.handle(login("b@x.com", "correct-horse")).await.unwrap_err();

        assert_eq!(wrong, AccountError::InvalidCredentials);
        assert_eq!(unknown, AccountError::InvalidCredentials);
    }
}
