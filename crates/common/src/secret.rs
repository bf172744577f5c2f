//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports from the [`secrecy`] crate, used everywhere the gateway
//! handles passwords, signing keys or API keys.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` while holding one gets safe logging for free. Reading
//! the inner value requires an explicit `expose_secret()` call, which
//! keeps every use of the raw material greppable.
//!
//! Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     username: "sherlock".to_string(),
//!     password: SecretString::from("password"),
//! };
//!
//! // Debug output redacts the password
//! let rendered = format!("{req:?}");
//! assert!(!rendered.contains("password\""));
//!
//! // Access requires an explicit call
//! let raw: &str = req.password.expose_secret();
//! ```
//!
//! # Gateway Usage
//!
//! Use `SecretString` for:
//! - User passwords (request bodies)
//! - The base64-encoded signing key (configuration)
//! - Email provider API keys

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("password123");
        assert_eq!(secret.expose_secret(), "password123");
    }

    #[test]
    fn test_login_shaped_struct_redacts_password() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Credentials {
            username: String,
            password: SecretString,
        }

        let json = r#"{"username": "watson", "password": "my-secret-value"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.password.expose_secret(), "my-secret-value");

        let debug = format!("{creds:?}");
        assert!(debug.contains("watson"));
        assert!(!debug.contains("my-secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_clone_works() {
        let secret = SecretString::from("cloneable");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "cloneable");
    }
}
