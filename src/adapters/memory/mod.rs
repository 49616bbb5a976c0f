//! In-memory adapters.
//!
//! Used by the test suite and by the development profile when no database is
//! wanted. Both stores can be switched into an "unavailable" mode to exercise
//! the storage-outage paths.

mod account_repository;
mod webhook_event_repository;

pub use account_repository::InMemoryAccountRepository;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
