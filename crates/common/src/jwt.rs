//! JWT claim types and validation primitives shared across the gateway.
//!
//! This module holds the pieces both the issuing side (token service) and
//! the verifying side (request guard) depend on:
//! - the claim structure embedded in every gateway token
//! - the token size cap applied before any parsing
//! - `kid` extraction from an unverified header for key lookup
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE base64 decoding or parsing
//! - The `sub` and `jti` fields are redacted in Debug output
//! - Error messages are generic; detail goes to debug-level traces only

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Oversized tokens are rejected before base64 decoding or signature
/// verification, so a hostile client cannot make the gateway allocate or
/// hash megabytes of garbage. Typical gateway tokens are 250-450 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Errors from pre-verification token inspection.
///
/// Messages are intentionally generic; callers log the variant at debug
/// level and surface a uniform unauthorized response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtInspectError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not structured as `header.payload.signature`.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token header carries no usable `kid` field.
    #[error("The access token is invalid or expired")]
    MissingKid,
}

/// The two kinds of token the gateway mints.
///
/// Access tokens are short-lived request credentials; refresh tokens are
/// long-lived and only accepted by the redemption endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims embedded in every gateway-issued token.
///
/// Invariant on issue: `exp > iat`. The refresh token additionally carries
/// a `jti` so a revocation deny-list can be introduced later without a
/// token-format change.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (the authenticated username) - redacted in Debug output.
    pub sub: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Whether this is an access or a refresh token.
    pub token_type: TokenKind,

    /// Roles granted to the subject.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Unique token identifier (refresh tokens only) - redacted in Debug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Custom Debug implementation that redacts identifying fields.
impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("token_type", &self.token_type)
            .field("roles", &self.roles)
            .field("jti", &self.jti.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl TokenClaims {
    /// Check whether the subject holds a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether the token is expired at `now`.
    ///
    /// A token is valid only while `now < exp`; a token expiring at exactly
    /// `now` is already expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// Extract the `kid` (key ID) from a JWT header without verifying the
/// signature.
///
/// Used to select the verification key when more than one may be live
/// (key rotation). The token MUST still be verified after key lookup;
/// nothing about the returned value is trustworthy on its own.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong segment count, bad base64, or invalid JSON
/// - `MissingKid` - header has no non-empty string `kid`
pub fn extract_kid(token: &str) -> Result<String, JwtInspectError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtInspectError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtInspectError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtInspectError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtInspectError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtInspectError::MalformedToken
    })?;

    // An empty kid selects no key, so it is treated as missing.
    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtInspectError::MissingKid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn claims(kind: TokenKind) -> TokenClaims {
        TokenClaims {
            sub: "sherlock".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            token_type: kind,
            roles: vec!["detective".to_string()],
            jti: None,
        }
    }

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_claims_debug_redacts_sub_and_jti() {
        let mut c = claims(TokenKind::Refresh);
        c.jti = Some("9f7c2f1e-unique".to_string());

        let debug_str = format!("{c:?}");

        assert!(!debug_str.contains("sherlock"));
        assert!(!debug_str.contains("9f7c2f1e"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_claims_has_role() {
        let c = claims(TokenKind::Access);
        assert!(c.has_role("detective"));
        assert!(!c.has_role("admin"));
        assert!(!c.has_role("detect")); // No partial match
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let c = claims(TokenKind::Access);
        // Valid strictly before exp
        assert!(!c.is_expired_at(c.exp - 1));
        // Expired at exactly exp
        assert!(c.is_expired_at(c.exp));
        assert!(c.is_expired_at(c.exp + 1));
    }

    #[test]
    fn test_token_kind_serializes_lowercase() {
        let json = serde_json::to_string(&claims(TokenKind::Access)).unwrap();
        assert!(json.contains("\"token_type\":\"access\""));

        let json = serde_json::to_string(&claims(TokenKind::Refresh)).unwrap();
        assert!(json.contains("\"token_type\":\"refresh\""));
    }

    #[test]
    fn test_claims_roundtrip_serialization() {
        let c = claims(TokenKind::Access);
        let json = serde_json::to_string(&c).unwrap();
        let back: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_claims_missing_roles_defaults_empty() {
        let json = r#"{"sub":"s","iat":1,"exp":2,"token_type":"access"}"#;
        let c: TokenClaims = serde_json::from_str(json).unwrap();
        assert!(c.roles.is_empty());
        assert!(c.jti.is_none());
    }

    #[test]
    fn test_claims_without_jti_omits_field() {
        let json = serde_json::to_string(&claims(TokenKind::Access)).unwrap();
        assert!(!json.contains("jti"));
    }

    #[test]
    fn test_extract_kid_valid_token() {
        let header = r#"{"alg":"HS256","typ":"JWT","kid":"gateway-key-01"}"#;
        let header_b64 = URL_SAFE_NO_PAD.encode(header);
        let token = format!("{header_b64}.payload.signature");

        assert_eq!(extract_kid(&token).unwrap(), "gateway-key-01");
    }

    #[test]
    fn test_extract_kid_missing_kid() {
        let header = r#"{"alg":"HS256","typ":"JWT"}"#;
        let header_b64 = URL_SAFE_NO_PAD.encode(header);
        let token = format!("{header_b64}.payload.signature");

        assert!(matches!(
            extract_kid(&token),
            Err(JwtInspectError::MissingKid)
        ));
    }

    #[test]
    fn test_extract_kid_empty_kid_rejected() {
        let header = r#"{"alg":"HS256","typ":"JWT","kid":""}"#;
        let header_b64 = URL_SAFE_NO_PAD.encode(header);
        let token = format!("{header_b64}.payload.signature");

        assert!(matches!(
            extract_kid(&token),
            Err(JwtInspectError::MissingKid)
        ));
    }

    #[test]
    fn test_extract_kid_non_string_kid() {
        let header = r#"{"alg":"HS256","typ":"JWT","kid":12345}"#;
        let header_b64 = URL_SAFE_NO_PAD.encode(header);
        let token = format!("{header_b64}.payload.signature");

        assert!(matches!(
            extract_kid(&token),
            Err(JwtInspectError::MissingKid)
        ));
    }

    #[test]
    fn test_extract_kid_malformed_tokens() {
        for bad in ["", "single", "only.two", "a.b.c.d", "!!!bad!!!.p.s"] {
            assert!(
                matches!(extract_kid(bad), Err(JwtInspectError::MalformedToken)),
                "expected MalformedToken for {bad:?}"
            );
        }
    }

    #[test]
    fn test_extract_kid_invalid_header_json() {
        let header_b64 = URL_SAFE_NO_PAD.encode("not-json");
        let token = format!("{header_b64}.payload.signature");

        assert!(matches!(
            extract_kid(&token),
            Err(JwtInspectError::MalformedToken)
        ));
    }

    #[test]
    fn test_extract_kid_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert!(matches!(
            extract_kid(&oversized),
            Err(JwtInspectError::TokenTooLarge)
        ));
    }
}
