//! Foundation module - Shared domain primitives.
//!
//! Value objects, identifiers and error types that form the vocabulary of
//! the PriceGuard domain.

mod email;
mod errors;
mod ids;
mod timestamp;

pub use email::Email;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::AccountId;
pub use timestamp::Timestamp;
