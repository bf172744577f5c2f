//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for token validation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub exp: i64,
    #[allow(dead_code)]
    pub iat: i64,
    pub token_type: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("sherlock")
///     .assert_token_type("access")
///     .assert_signed_by("test-key-01");
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a valid HS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert the token kind ("access" or "refresh")
    fn assert_token_type(&self, kind: &str) -> &Self;

    /// Assert that the token's header names the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token expires within the specified seconds
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    /// Assert that the token grants the specified role
    fn assert_has_role(&self, role: &str) -> &Self;
}

fn decode_claims(token: &str) -> JwtClaims {
    let parts: Vec<_> = token.split('.').collect();
    assert_eq!(
        parts.len(),
        3,
        "JWT must have 3 parts (header.payload.signature), got {}",
        parts.len()
    );
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .expect("Invalid JWT payload");
    serde_json::from_slice(&payload).expect("Failed to parse JWT claims")
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header_bytes = URL_SAFE_NO_PAD
            .decode(parts[0])
            .expect("Failed to base64 decode JWT header");
        let header: JwtHeader =
            serde_json::from_slice(&header_bytes).expect("Failed to parse JWT header JSON");

        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        // Claims must parse too
        decode_claims(self);

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );
        self
    }

    fn assert_token_type(&self, kind: &str) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.token_type, kind,
            "Expected token_type '{}', got '{}'",
            kind, claims.token_type
        );
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        let header = URL_SAFE_NO_PAD
            .decode(parts[0])
            .expect("Invalid JWT header");
        let jwt_header: JwtHeader =
            serde_json::from_slice(&header).expect("Failed to parse JWT header");

        assert_eq!(
            jwt_header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            jwt_header.kid
        );

        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = decode_claims(self);
        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;

        // Allow 5-second tolerance for clock skew
        assert!(
            (expires_in - seconds).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims = decode_claims(self);
        assert!(
            claims.roles.iter().any(|r| r == role),
            "Token does not grant role '{}'. Available roles: {:?}",
            role,
            claims.roles
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_builders::TestTokenBuilder;

    const KEY: &[u8] = &[1u8; 32];

    #[test]
    fn test_assert_valid_jwt_with_valid_token() {
        let token = TestTokenBuilder::new().sign(KEY, "test-key-01");
        token.assert_valid_jwt();
    }

    #[test]
    #[should_panic(expected = "JWT must have 3 parts")]
    fn test_assert_valid_jwt_with_invalid_structure() {
        let token = "invalid.token".to_string();
        token.assert_valid_jwt();
    }

    #[test]
    fn test_assert_subject_and_type() {
        let token = TestTokenBuilder::new()
            .for_subject("sherlock")
            .token_type("refresh")
            .sign(KEY, "test-key-01");

        token
            .assert_for_subject("sherlock")
            .assert_token_type("refresh")
            .assert_signed_by("test-key-01");
    }

    #[test]
    #[should_panic(expected = "Expected subject")]
    fn test_assert_for_subject_mismatch() {
        let token = TestTokenBuilder::new()
            .for_subject("sherlock")
            .sign(KEY, "test-key-01");
        token.assert_for_subject("watson");
    }

    #[test]
    fn test_assert_expires_in() {
        let token = TestTokenBuilder::new()
            .expires_in(3600)
            .sign(KEY, "test-key-01");
        token.assert_expires_in(3600);
    }

    #[test]
    fn test_assert_has_role() {
        let token = TestTokenBuilder::new()
            .with_role("detective")
            .sign(KEY, "test-key-01");
        token.assert_has_role("detective");
    }

    #[test]
    #[should_panic(expected = "does not grant role")]
    fn test_assert_has_role_missing() {
        let token = TestTokenBuilder::new().sign(KEY, "test-key-01");
        token.assert_has_role("admin");
    }
}
