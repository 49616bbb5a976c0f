//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands mutate the account store (and usually a processor); queries only
//! read.

pub mod handlers;

pub use handlers::account::{LoginCommand, LoginHandler, RegisterCommand, RegisterHandler};
pub use handlers::webhooks::{WebhookDispatcher, WebhookOutcome};
