//! PostgreSQL adapters - sqlx implementations of the repository ports.
//!
//! - `PostgresAccountRepository` - accounts table, single-statement patches
//! - `PostgresWebhookEventRepository` - webhook delivery ledger
//!
//! Connection-level failures surface as `ErrorCode::StorageUnavailable`.

mod account_repository;
mod errors;
mod webhook_event_repository;

pub use account_repository::PostgresAccountRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
