//! Password hashing

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// One-way password hashing with verification.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a storable string.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash.
    ///
    /// `Ok(false)` means the password is wrong; `Err` means the stored hash is unusable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id hasher producing PHC strings
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| Error::Hashing(e.to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
