//! PasswordHasher port.

use crate::domain::foundation::DomainError;

/// One-way credential hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// False for a wrong password or an unparseable stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
