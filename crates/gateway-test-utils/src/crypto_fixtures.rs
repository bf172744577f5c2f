//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible HS256 signing keys and ready-made gateway
//! configuration. All fixtures are deterministic based on seed values.

use gateway_service::config::Config;

/// Key ID used by test configurations.
pub const TEST_KEY_ID: &str = "test-key-01";

/// Bcrypt cost for tests: the algorithm floor, so password hashing does
/// not dominate test runtime.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Deterministic 32-byte HS256 signing key.
///
/// The same seed always produces the same key, ensuring test
/// reproducibility. Different seeds produce different keys, which is how
/// tests build "signed by someone else" tokens.
pub fn test_signing_key(seed: u8) -> Vec<u8> {
    let mut key = vec![0u8; 32];
    for (i, byte) in key.iter_mut().enumerate() {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(seed).wrapping_add(i as u8);
    }
    key
}

/// Gateway configuration for tests: deterministic key, fast bcrypt,
/// 1 hour access TTL and 30 day refresh TTL.
pub fn test_config(seed: u8) -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        signing_key: test_signing_key(seed),
        key_id: TEST_KEY_ID.to_string(),
        access_ttl_seconds: 3600,
        refresh_ttl_seconds: 2_592_000,
        bcrypt_cost: TEST_BCRYPT_COST,
        email: None,
    }
}
