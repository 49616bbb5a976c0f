//! Credential adapters.
//!
//! - `Argon2PasswordHasher` - argon2id PHC hashing for account passwords

mod argon2_hasher;

pub use argon2_hasher::Argon2PasswordHasher;
