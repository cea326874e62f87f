// Password hashing.

use anyhow::Result;
use bcrypt::{hash, verify};
use campus_core::errors::CampusError;

use crate::options::PasswordPolicy;

/// One-way salted hashing and verification of passwords.
///
/// Principals stay plain data records; all credential behavior lives here.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    policy: PasswordPolicy,
}

impl PasswordHasher {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    /// Derive a salted bcrypt hash. Passwords below the minimum length are
    /// rejected before any work is done.
    pub fn hash_password(&self, plaintext: &str) -> Result<String> {
        if plaintext.trim().is_empty() || plaintext.len() < self.policy.min_length {
            return Err(CampusError::weak_credential(format!(
                "Password must be at least {} characters",
                self.policy.min_length
            ))
            .into_anyhow());
        }
        hash(plaintext, self.policy.cost).map_err(|e| anyhow::anyhow!(e.to_string()))
    }

    /// Compare a plaintext against a stored hash. Pure; neither side is
    /// ever logged.
    pub fn verify_password(&self, plaintext: &str, stored_hash: &str) -> Result<bool> {
        verify(plaintext, stored_hash).map_err(|e| anyhow::anyhow!(e.to_string()))
    }
}
