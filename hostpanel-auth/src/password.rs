//! Password hashing for the credential store.
//!
//! bcrypt with a per-call random salt: hashing the same input twice yields
//! different strings, and verification is constant-time over the stored
//! digest. bcrypt silently ignores input beyond 72 bytes, so longer inputs
//! are rejected outright instead of being truncated.

/// bcrypt's maximum supported input length in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Errors that can occur while hashing or verifying passwords.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PasswordError {
    /// The plaintext exceeds bcrypt's 72-byte limit.
    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    TooLong,

    /// The underlying hash computation failed.
    #[error("hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a plaintext password for storage.
///
/// # Errors
/// Returns [`PasswordError::TooLong`] for inputs over 72 bytes rather than
/// letting bcrypt truncate them.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Compare a plaintext password against a stored hash.
///
/// # Errors
/// Returns [`PasswordError::TooLong`] for over-long inputs (they can never
/// match a hash produced by [`hash_password`]), or [`PasswordError::Hash`]
/// if the stored hash is not parseable.
pub fn verify_password(plaintext: &str, stored: &str) -> Result<bool, PasswordError> {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(bcrypt::verify(plaintext, stored)?)
}
