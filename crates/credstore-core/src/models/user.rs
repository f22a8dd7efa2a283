use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::error::{StoreError, StoreResult};

/// A resource owner.
///
/// Only the Argon2 PHC string of the password is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user, hashing the plaintext password with Argon2.
    pub fn new(username: String, password: &str, roles: Vec<String>) -> StoreResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::Crypto(e.to_string()))?
            .to_string();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            roles,
            created_at: Utc::now(),
        })
    }

    /// Verify a presented password against the stored hash.
    ///
    /// An unparseable stored hash verifies as false; the caller treats it the
    /// same as a wrong password.
    pub fn verify_password(&self, candidate: &str) -> bool {
        PasswordHash::new(&self.password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
