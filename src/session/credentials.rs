use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

use crate::config::AdminCredentials;
use crate::shared::AppError;

#[derive(Error, Debug, PartialEq)]
pub enum CredentialError {
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("failed to hash password: {0}")]
    Hashing(String),
}

impl From<CredentialError> for AppError {
    fn from(error: CredentialError) -> Self {
        tracing::error!(error = %error, "Credential processing failed");
        AppError::Internal
    }
}

/// Plaintext comparison against the configured administrator.
pub fn verify_admin(email: &str, password: &str, admin: &AdminCredentials) -> bool {
    email == admin.email && password == admin.password
}

/// Checks a student password against its stored Argon2 PHC string.
pub fn verify_student(password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}
