//! Password hashing
//!
//! Passwords are stored as argon2 PHC strings. Hashing is CPU-bound, so it runs on
//! the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};

use crate::error::{CoreError, Result};

/// Hash `password` with a fresh salt.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CoreError::PasswordHash {
                reason: e.to_string(),
            })
    })
    .await
    .map_err(|e| CoreError::PasswordHash {
        reason: e.to_string(),
    })?
}
