//! Observability for the token gateway.
//!
//! # Privacy by Default
//!
//! Instrumentation uses `#[instrument(skip_all)]` with explicit field
//! allow-listing. Fields fall into three classes:
//! - **SAFE**: logged in plaintext (outcome labels, endpoint names)
//! - **HASHED**: SHA-256 hashed for correlation (usernames, subjects)
//! - **NEVER**: must not appear in logs (passwords, tokens, keys)

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for fields like usernames that need correlation across log
/// entries but should not be stored in plaintext. This is a one-way
/// transformation for debugging, not a cryptographic protection for
/// secrets; truncation to 8 chars gives enough uniqueness for
/// correlation while limiting reversibility.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // First 4 bytes = 8 hex chars
    hex::encode(result.get(..4).unwrap_or_default())
}
