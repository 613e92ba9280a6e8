// models/src/credentials.rs

pub use bcrypt::BcryptError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a raw secret for storage. Patient and admin passwords go through
/// this before any insert.
pub fn hash_password(raw: &str) -> Result<String, BcryptError> {
    hash(raw, DEFAULT_COST)
}

pub fn verify_password(raw: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(raw, hashed)
}
