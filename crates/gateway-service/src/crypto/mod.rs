//! Cryptographic operations for the token gateway.
//!
//! Covers HS256 token signing and verification, password hashing, and
//! signing key generation.
//!
//! # Security
//!
//! - Tokens are size-checked before any parsing
//! - Verification pins the algorithm to HS256; `alg: none` and algorithm
//!   confusion tokens fail before claims are read
//! - Passwords are hashed with bcrypt, never stored or logged in plaintext

use crate::errors::GatewayError;
use common::jwt::{TokenClaims, MAX_JWT_SIZE_BYTES};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

/// Claims every gateway token must carry. Checked by name after
/// signature verification so a missing claim is reported precisely.
const REQUIRED_CLAIMS: [&str; 4] = ["sub", "iat", "exp", "token_type"];

/// Why a token failed decoding.
///
/// Expiry is deliberately NOT decoded here: a token that expires at or
/// before "now" still decodes successfully, and the caller decides what
/// "now" means. This keeps lifetime policy in one place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Structurally broken token or signature mismatch.
    #[error("token structure or signature is invalid")]
    MalformedSignature,

    /// Signature verified but a required claim is absent.
    #[error("token is missing required claim: {0}")]
    MissingClaim(String),
}

/// Sign claims into a compact JWT with the given HS256 key.
///
/// The `kid` header is always stamped so verifiers can select the right
/// key during rotation.
///
/// # Errors
///
/// Returns `GatewayError::Crypto` if serialization or signing fails.
pub fn sign_claims(
    claims: &TokenClaims,
    key: &[u8],
    key_id: &str,
) -> Result<String, GatewayError> {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(key_id.to_string());

    encode(&header, claims, &EncodingKey::from_secret(key)).map_err(|e| {
        tracing::error!(target: "gateway.crypto", error = %e, "JWT signing failed");
        GatewayError::Crypto("JWT signing failed".to_string())
    })
}

/// Verify a token's signature and decode its claims.
///
/// # Security Checks
///
/// 1. Size check - reject tokens over 8KB before parsing
/// 2. Verify HS256 signature (constant-time HMAC comparison)
/// 3. Check required claims by name
///
/// Expiry is NOT evaluated here; see [`DecodeError`].
///
/// # Errors
///
/// - `MalformedSignature` - oversized, structurally invalid, wrong
///   algorithm, or signature mismatch
/// - `MissingClaim(name)` - signature valid but `name` is absent
pub fn decode_claims(token: &str, key: &[u8]) -> Result<TokenClaims, DecodeError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "gateway.crypto",
            token_size = token.len(),
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(DecodeError::MalformedSignature);
    }

    // Claim presence and expiry are checked by us, not by the library,
    // so a missing claim can be reported by name and expiry policy
    // stays with the caller.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<serde_json::Value>(token, &DecodingKey::from_secret(key), &validation)
        .map_err(|e| {
            tracing::debug!(target: "gateway.crypto", error = %e, "Token verification failed");
            DecodeError::MalformedSignature
        })?;

    for claim in REQUIRED_CLAIMS {
        if token_data.claims.get(claim).is_none() {
            tracing::debug!(target: "gateway.crypto", claim, "Token missing required claim");
            return Err(DecodeError::MissingClaim(claim.to_string()));
        }
    }

    serde_json::from_value(token_data.claims).map_err(|e| {
        tracing::debug!(target: "gateway.crypto", error = %e, "Token claims have invalid shape");
        DecodeError::MalformedSignature
    })
}

/// Generate a fresh 32-byte HS256 signing key.
///
/// # Errors
///
/// Returns `GatewayError::Crypto` if the system RNG fails.
pub fn generate_signing_key() -> Result<[u8; 32], GatewayError> {
    let rng = SystemRandom::new();
    let mut key = [0u8; 32];
    rng.fill(&mut key).map_err(|_| {
        tracing::error!(target: "gateway.crypto", "System RNG failure during key generation");
        GatewayError::Crypto("Failed to generate signing key".to_string())
    })?;
    Ok(key)
}

/// Hash a password with bcrypt at the given cost.
///
/// # Errors
///
/// Returns `GatewayError::Crypto` if hashing fails.
pub fn hash_password(password: &str, cost: u32) -> Result<String, GatewayError> {
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!(target: "gateway.crypto", error = %e, "Password hashing failed");
        GatewayError::Crypto("Password hashing failed".to_string())
    })
}

/// Verify a password against a bcrypt hash.
///
/// # Errors
///
/// Returns `GatewayError::Crypto` if the stored hash is not parseable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, GatewayError> {
    bcrypt::verify(password, hash).map_err(|e| {
        tracing::error!(target: "gateway.crypto", error = %e, "Password verification failed");
        GatewayError::Crypto("Password verification failed".to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use common::jwt::TokenKind;
    use serde_json::json;

    const TEST_KEY: &[u8] = &[42u8; 32];
    const OTHER_KEY: &[u8] = &[7u8; 32];

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "sherlock".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            token_type: TokenKind::Access,
            roles: vec![],
            jti: None,
        }
    }

    /// Sign arbitrary JSON so tests can build tokens with claims omitted.
    fn sign_raw(claims: &serde_json::Value, key: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(key),
        )
        .unwrap()
    }

    #[test]
    fn test_sign_and_decode_roundtrip() {
        let claims = sample_claims();
        let token = sign_claims(&claims, TEST_KEY, "gateway-key-01").unwrap();

        let decoded = decode_claims(&token, TEST_KEY).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_signed_token_carries_kid_header() {
        let token = sign_claims(&sample_claims(), TEST_KEY, "gateway-key-01").unwrap();
        assert_eq!(
            common::jwt::extract_kid(&token).unwrap(),
            "gateway-key-01"
        );
    }

    #[test]
    fn test_decode_rejects_wrong_key() {
        let token = sign_claims(&sample_claims(), TEST_KEY, "gateway-key-01").unwrap();
        assert_eq!(
            decode_claims(&token, OTHER_KEY),
            Err(DecodeError::MalformedSignature)
        );
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let token = sign_claims(&sample_claims(), TEST_KEY, "gateway-key-01").unwrap();

        // Swap the payload for one claiming a different subject, keeping
        // the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&json!({
                "sub": "moriarty",
                "iat": 1_700_000_000,
                "exp": 1_700_003_600,
                "token_type": "access",
            }))
            .unwrap(),
        );
        let forged = format!(
            "{}.{}.{}",
            parts.first().unwrap(),
            forged_payload,
            parts.get(2).unwrap()
        );

        assert_eq!(
            decode_claims(&forged, TEST_KEY),
            Err(DecodeError::MalformedSignature)
        );
    }

    #[test]
    fn test_decode_rejects_truncated_signature() {
        let token = sign_claims(&sample_claims(), TEST_KEY, "gateway-key-01").unwrap();
        let mut truncated = token.clone();
        truncated.pop();

        assert_eq!(
            decode_claims(&truncated, TEST_KEY),
            Err(DecodeError::MalformedSignature)
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for bad in ["", "foo", "a.b", "a.b.c"] {
            assert_eq!(
                decode_claims(bad, TEST_KEY),
                Err(DecodeError::MalformedSignature),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            decode_claims(&oversized, TEST_KEY),
            Err(DecodeError::MalformedSignature)
        );
    }

    #[test]
    fn test_decode_reports_missing_claims_by_name() {
        let cases = [
            (json!({"iat": 1, "exp": 2, "token_type": "access"}), "sub"),
            (json!({"sub": "s", "exp": 2, "token_type": "access"}), "iat"),
            (json!({"sub": "s", "iat": 1, "token_type": "access"}), "exp"),
            (json!({"sub": "s", "iat": 1, "exp": 2}), "token_type"),
        ];

        for (claims, expected) in cases {
            let token = sign_raw(&claims, TEST_KEY);
            assert_eq!(
                decode_claims(&token, TEST_KEY),
                Err(DecodeError::MissingClaim(expected.to_string())),
                "claims {claims} should report missing {expected}"
            );
        }
    }

    #[test]
    fn test_decode_does_not_evaluate_expiry() {
        // A long-expired token still decodes; expiry is the caller's call.
        let mut claims = sample_claims();
        claims.exp = 1; // 1970
        let token = sign_claims(&claims, TEST_KEY, "gateway-key-01").unwrap();

        let decoded = decode_claims(&token, TEST_KEY).unwrap();
        assert_eq!(decoded.exp, 1);
    }

    #[test]
    fn test_decode_rejects_unsigned_alg_none_token() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&json!({
                "sub": "sherlock",
                "iat": 1_700_000_000,
                "exp": 9_999_999_999i64,
                "token_type": "access",
            }))
            .unwrap(),
        );
        let token = format!("{header}.{payload}.");

        assert_eq!(
            decode_claims(&token, TEST_KEY),
            Err(DecodeError::MalformedSignature)
        );
    }

    #[test]
    fn test_generate_signing_key_produces_distinct_keys() {
        let a = generate_signing_key().unwrap();
        let b = generate_signing_key().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("password", 4).unwrap();
        assert!(verify_password("password", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_bad_hash_errors() {
        let result = verify_password("password", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(GatewayError::Crypto(_))));
    }
}
