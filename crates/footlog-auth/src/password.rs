//! Argon2 credential hashing and verification.
//!
//! Raw secrets pass through here and nowhere else; they are never logged.
use super::AuthError;
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

fn salt() -> Result<SaltString, AuthError> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes).map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn hash(password: &str) -> Result<String, AuthError> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Fails with [`AuthError::InvalidCredential`] unless `password` matches.
pub fn check(password: &str, hashword: &str) -> Result<(), AuthError> {
    match verify(password, hashword) {
        true => Ok(()),
        false => Err(AuthError::InvalidCredential),
    }
}

/// Hash of a random secret nobody knows, for accounts that only log in
/// through a provider.
pub fn unusable() -> Result<String, AuthError> {
    hash(&uuid::Uuid::new_v4().to_string())
}
