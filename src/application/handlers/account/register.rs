//! RegisterHandler - creates an account with a hashed password.

use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::domain::account::{AccountError, AccountSummary, CardOnFile, NewAccount};
use crate::domain::foundation::{Email, ValidationError};
use crate::ports::{AccountRepository, PasswordHasher};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_CARD_TOKEN_LEN: usize = 255;

#[derive(Debug, Clone, Default)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub plan: String,
    pub card_last4: Option<String>,
    pub credit_card_token: Option<String>,
    pub billing_zip: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
}

pub struct RegisterHandler {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegisterHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { accounts, hasher }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<AccountSummary, AccountError> {
        let email = Email::new(&cmd.email)?;
        if cmd.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::too_short("password", MIN_PASSWORD_LEN).into());
        }
        let plan = cmd.plan.trim();
        if plan.is_empty() {
            return Err(ValidationError::empty_field("plan").into());
        }
        let card_last4 = match cmd.card_last4.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(digits) if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) => {
                Some(digits.to_string())
            }
            Some(_) => {
                return Err(AccountError::validation(
                    "cardLast4",
                    "Card last 4 must be exactly 4 digits",
                ))
            }
        };
        let card_on_file = card_on_file(&cmd)?;
        if card_on_file.token.is_some() && card_last4.is_none() {
            return Err(AccountError::validation(
                "cardLast4",
                "cardLast4 is required when a creditCardToken is provided",
            ));
        }

        let password_hash = self.hasher.hash(&cmd.password)?;

        let account = self
            .accounts
            .insert(NewAccount {
                email,
                password_hash,
                plan: plan.to_string(),
                card_last4,
                card_on_file,
            })
            .await?
            .ok_or(AccountError::AlreadyExists)?;

        tracing::info!(account_id = %account.id, "Registered account");
        Ok(AccountSummary::from(&account))
    }
}

fn card_on_file(cmd: &RegisterCommand) -> Result<CardOnFile, AccountError> {
    let token = match cmd.credit_card_token.as_deref() {
        None => None,
        Some(t) if (1..=MAX_CARD_TOKEN_LEN).contains(&t.chars().count()) => Some(t.to_string()),
        Some(_) => {
            return Err(AccountError::validation(
                "creditCardToken",
                "Card token must be between 1 and 255 characters",
            ))
        }
    };
    let billing_zip = match cmd.billing_zip.as_deref().map(str::trim) {
        None => None,
        Some(zip) if (3..=10).contains(&zip.chars().count()) => Some(zip.to_string()),
        Some(_) => {
            return Err(AccountError::validation(
                "billingZip",
                "Billing ZIP must be between 3 and 10 characters",
            ))
        }
    };
    if let Some(month) = cmd.expiry_month.filter(|m| !(1..=12).contains(m)) {
        return Err(AccountError::validation(
            "expiryMonth",
            format!("Expiry month {} is not between 1 and 12", month),
        ));
    }
    let this_year = Utc::now().year();
    if let Some(year) = cmd.expiry_year.filter(|y| !(this_year..=9999).contains(y)) {
        return Err(AccountError::validation(
            "expiryYear",
            format!("Expiry year {} is out of range", year),
        ));
    }

    Ok(CardOnFile {
        token,
        billing_zip,
        expiry_month: cmd.expiry_month,
        expiry_year: cmd.expiry_year,
    })
}
