//! Builder patterns for test data construction
//!
//! Provides fluent APIs for creating test tokens, including deliberately
//! broken ones (missing claims, expired, tampered).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

/// Builder for test JWT claims.
///
/// Every claim is optional so tests can construct tokens that omit
/// required claims. Defaults produce a valid access token for
/// "test-subject" good for one hour.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("sherlock")
///     .expires_in(-60) // already expired
///     .sign(&key, "test-key-01");
/// ```
pub struct TestTokenBuilder {
    sub: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
    token_type: Option<String>,
    roles: Vec<String>,
    jti: Option<String>,
}

impl TestTokenBuilder {
    /// Create a new token builder with valid defaults
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Some("test-subject".to_string()),
            iat: Some(now.timestamp()),
            exp: Some((now + Duration::seconds(3600)).timestamp()),
            token_type: Some("access".to_string()),
            roles: Vec::new(),
            jti: None,
        }
    }

    /// Set the subject
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = Some(subject.to_string());
        self
    }

    /// Set the token kind: "access" or "refresh"
    pub fn token_type(mut self, kind: &str) -> Self {
        self.token_type = Some(kind.to_string());
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = Some(timestamp);
        self
    }

    /// Add a role
    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.push(role.to_string());
        self
    }

    /// Set the token identifier
    pub fn with_jti(mut self, jti: &str) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Drop a claim entirely ("sub", "iat", "exp" or "token_type")
    pub fn without_claim(mut self, claim: &str) -> Self {
        match claim {
            "sub" => self.sub = None,
            "iat" => self.iat = None,
            "exp" => self.exp = None,
            "token_type" => self.token_type = None,
            other => panic!("unknown claim: {other}"),
        }
        self
    }

    /// Build the claims as a JSON value, omitting dropped claims
    pub fn build(self) -> Value {
        let mut claims = json!({ "roles": self.roles });
        if let Some(sub) = self.sub {
            claims["sub"] = json!(sub);
        }
        if let Some(iat) = self.iat {
            claims["iat"] = json!(iat);
        }
        if let Some(exp) = self.exp {
            claims["exp"] = json!(exp);
        }
        if let Some(token_type) = self.token_type {
            claims["token_type"] = json!(token_type);
        }
        if let Some(jti) = self.jti {
            claims["jti"] = json!(jti);
        }
        claims
    }

    /// Build and sign into a compact HS256 JWT with a `kid` header
    pub fn sign(self, key: &[u8], key_id: &str) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(key_id.to_string());
        encode(&header, &self.build(), &EncodingKey::from_secret(key))
            .expect("test token signing should not fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a token's payload without re-signing it, producing a token
/// whose signature no longer matches.
pub fn tamper_with_payload(token: &str) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "expected a compact JWT");

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .expect("payload should be valid base64");
    let mut claims: Value =
        serde_json::from_slice(&payload_bytes).expect("payload should be valid JSON");
    claims["sub"] = json!("mallory");

    let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    format!("{}.{}.{}", parts[0], forged_payload, parts[2])
}
