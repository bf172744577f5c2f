//! Request and response models for the token gateway.

use common::secret::SecretString;
use serde::{Deserialize, Serialize};

/// Body of POST /login.
///
/// The password deserializes straight into a `SecretString` so it cannot
/// leak through Debug or tracing output.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// Body of POST /oauth/access_token.
#[derive(Debug, Deserialize)]
pub struct TokenRefreshRequest {
    pub grant_type: String,
    pub refresh_token: String,
}

/// Successful login/refresh response: the issued token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerAccessRefreshToken {
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// An authenticated identity produced by credential validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    #[test]
    fn test_login_request_password_is_redacted() {
        let json = r#"{"username": "sherlock", "password": "hunter2"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.username, "sherlock");
        assert_eq!(request.password.expose_secret(), "hunter2");

        let debug_str = format!("{request:?}");
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("REDACTED"));
    }

    #[test]
    fn test_bearer_response_serializes_all_fields() {
        let response = BearerAccessRefreshToken {
            username: "sherlock".to_string(),
            access_token: "a.b.c".to_string(),
            refresh_token: "d.e.f".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();
        assert_eq!(json["username"], "sherlock");
        assert_eq!(json["access_token"], "a.b.c");
        assert_eq!(json["refresh_token"], "d.e.f");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
    }

    #[test]
    fn test_refresh_request_deserializes() {
        let json = r#"{"grant_type": "refresh_token", "refresh_token": "d.e.f"}"#;
        let request: TokenRefreshRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.grant_type, "refresh_token");
        assert_eq!(request.refresh_token, "d.e.f");
    }
}
