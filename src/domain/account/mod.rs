//! Account aggregate and the billing-field update rules shared by commands
//! and webhooks.

mod account;
mod errors;
mod patch;
mod selector;

pub use account::{Account, AccountSummary, CardOnFile, NewAccount};
pub use errors::AccountError;
pub use patch::{BillingPatch, PatchEffect, PatchOutcome};
pub use selector::AccountSelector;
