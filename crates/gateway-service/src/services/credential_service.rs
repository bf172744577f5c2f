//! Credential validation.
//!
//! The gateway authenticates against a [`CredentialValidator`], a trait
//! so the user store can be swapped (in-memory today, a directory or
//! database later) without touching the token issuance path.
//!
//! # Timing
//!
//! An unknown username must cost the same as a known username with a
//! wrong password, otherwise response timing enumerates valid accounts.
//! Every authentication attempt therefore runs exactly one bcrypt
//! verification, against a dummy hash when the user does not exist. The
//! dummy hash is computed at the same cost as the real ones.

use crate::crypto;
use crate::errors::GatewayError;
use crate::models::Principal;
use std::collections::HashMap;

/// Validates login credentials and produces the authenticated principal.
pub trait CredentialValidator: Send + Sync {
    /// Check a username/password pair.
    ///
    /// Returns `Ok(Some(principal))` on success, `Ok(None)` when the
    /// credentials do not match. Implementations must take the same time
    /// for unknown usernames as for wrong passwords.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Crypto` if password verification itself
    /// fails (corrupt stored hash).
    fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<Principal>, GatewayError>;
}

struct StoredUser {
    password_hash: String,
    roles: Vec<String>,
}

/// In-memory credential store with bcrypt-hashed passwords.
pub struct FixedUserValidator {
    users: HashMap<String, StoredUser>,
    cost: u32,

    /// Verified when the username is unknown, so unknown and known users
    /// take the same time to reject.
    dummy_hash: String,
}

impl FixedUserValidator {
    /// Create an empty store. All passwords, including the dummy hash,
    /// are hashed at `cost`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Crypto` if hashing fails.
    pub fn new(cost: u32) -> Result<Self, GatewayError> {
        let dummy_hash = crypto::hash_password("gateway-dummy-password", cost)?;
        Ok(Self {
            users: HashMap::new(),
            cost,
            dummy_hash,
        })
    }

    /// Add a user.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Crypto` if hashing fails.
    pub fn with_user(
        mut self,
        username: &str,
        password: &str,
        roles: &[&str],
    ) -> Result<Self, GatewayError> {
        let password_hash = crypto::hash_password(password, self.cost)?;
        self.users.insert(
            username.to_string(),
            StoredUser {
                password_hash,
                roles: roles.iter().map(ToString::to_string).collect(),
            },
        );
        Ok(self)
    }

    /// Build the default user set (sherlock and watson).
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Crypto` if hashing fails.
    pub fn seeded(cost: u32) -> Result<Self, GatewayError> {
        Self::new(cost)?
            .with_user("sherlock", "password", &[])?
            .with_user("watson", "password", &[])
    }
}

impl CredentialValidator for FixedUserValidator {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, GatewayError> {
        let stored = self.users.get(username);

        // Always run exactly one bcrypt verification.
        let hash_to_verify = stored.map_or(self.dummy_hash.as_str(), |u| u.password_hash.as_str());
        let is_valid = crypto::verify_password(password, hash_to_verify)?;

        match stored {
            Some(user) if is_valid => Ok(Some(Principal {
                username: username.to_string(),
                roles: user.roles.clone(),
            })),
            _ => Ok(None),
        }
    }
}
