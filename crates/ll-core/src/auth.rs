//! Credential handling: argon2id password hashes and bearer-token digests.

use crate::error::LifelineError;
use crate::types::SessionToken;
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use sha2::{Digest, Sha256};

pub fn hash_password(password: &str) -> Result<String, LifelineError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| LifelineError::internal(format!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, LifelineError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| LifelineError::internal(format!("invalid password hash: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(LifelineError::internal(format!(
            "password verification failed: {err}"
        ))),
    }
}

/// Hex SHA-256 of the token. Only digests are persisted.
pub fn token_digest(token: &SessionToken) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
