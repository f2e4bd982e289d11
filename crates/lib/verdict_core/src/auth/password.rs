//! Password hashing via bcrypt.

use rand::distr::Alphanumeric;
use rand::{Rng, rng};

use super::AuthError;

/// bcrypt cost factor used by the server.
pub const DEFAULT_COST: u32 = 10;

/// Lowest cost bcrypt accepts; only suitable for tests.
pub const MIN_COST: u32 = 4;

/// Salted bcrypt hasher. Every call to [`PasswordHasher::hash`] draws a fresh salt.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash of a random throwaway password, verified against when the
    /// account does not exist.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Build a hasher with the given bcrypt cost.
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let throwaway: String = rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let dummy_hash = bcrypt::hash(throwaway, cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a password with bcrypt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a bcrypt hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
    }

    /// Run a verification whose outcome is discarded.
    pub fn verify_dummy(&self, password: &str) {
        let _ = bcrypt::verify(password, &self.dummy_hash);
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
