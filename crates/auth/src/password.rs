//! Password hashing primitives (bcrypt).
//!
//! These calls are CPU-bound and blocking; async callers should run them on a
//! blocking pool rather than on a request-handling task.

use thiserror::Error;

/// bcrypt work factor used unless configuration overrides it.
pub const DEFAULT_COST: u32 = 10;

/// bcrypt only reads this many bytes of input; anything past it is ignored.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// A salted bcrypt hash in its modular-crypt string form.
///
/// Deliberately not `Serialize`, and `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string loaded from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(String),

    #[error("password exceeds {PASSWORD_MAX_BYTES} bytes")]
    TooLong,
}

/// Hash a plaintext password with a fresh random salt.
///
/// Two calls with the same input produce different strings. Inputs longer
/// than [`PASSWORD_MAX_BYTES`] are refused rather than truncated.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<PasswordHash, HashError> {
    if plaintext.len() > PASSWORD_MAX_BYTES {
        return Err(HashError::TooLong);
    }
    Ok(PasswordHash(bcrypt::hash(plaintext, cost)?))
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash is an error, not a mismatch. An over-long
/// plaintext never matches, since no stored hash was made from one.
pub fn verify_password(plaintext: &str, hash: &PasswordHash) -> Result<bool, HashError> {
    if plaintext.len() > PASSWORD_MAX_BYTES {
        return Ok(false);
    }
    Ok(bcrypt::verify(plaintext, hash.as_str())?)
}
