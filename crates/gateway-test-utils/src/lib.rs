//! # Gateway Test Utilities
//!
//! Shared test utilities for the Token Gateway service.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed signing keys, test config)
//! - Test data builders (TestTokenBuilder)
//! - Server test harness (TestGateway for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestGateway::spawn()?;
//!
//!     let token = TestTokenBuilder::new()
//!         .for_subject("sherlock")
//!         .sign(&server.signing_key(), "test-key-01");
//!
//!     token.assert_valid_jwt().assert_for_subject("sherlock");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
