//! Token issuance, validation and refresh redemption.
//!
//! Issues access/refresh token pairs after credential validation, decides
//! whether a presented bearer token is still good, and redeems refresh
//! tokens for fresh pairs.
//!
//! Tokens are stateless: everything needed to validate one is in the
//! token itself plus the signing key. There is no server-side session or
//! revocation store; refresh tokens carry a `jti` so a deny-list can be
//! added without a format change.

use crate::config::Config;
use crate::crypto::{self, DecodeError};
use crate::errors::GatewayError;
use crate::models::{BearerAccessRefreshToken, Principal};
use crate::observability;
use crate::services::credential_service::CredentialValidator;
use chrono::Utc;
use common::jwt::{TokenClaims, TokenKind};
use tracing::instrument;
use uuid::Uuid;

/// The result of inspecting a presented bearer token.
///
/// Expiry is decided HERE, not in the codec: a token is valid only while
/// `now < exp`, so a token expiring at exactly `now` is already expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(TokenClaims),
    Expired,
    MalformedSignature,
    MissingClaim(String),
    Absent,
}

impl ValidationOutcome {
    /// Bounded label for metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid(_) => "valid",
            ValidationOutcome::Expired => "expired",
            ValidationOutcome::MalformedSignature => "malformed_signature",
            ValidationOutcome::MissingClaim(_) => "missing_claim",
            ValidationOutcome::Absent => "absent",
        }
    }
}

/// Authenticate a login and issue a token pair.
///
/// Credential validation always runs a full bcrypt verification (see
/// `credential_service`), so rejected logins cost the same whether the
/// username exists or not.
///
/// # Errors
///
/// - `CredentialsRejected` - username/password did not match
/// - `InvalidPrincipal` - validator accepted but produced an empty username
/// - `Crypto` - hashing or signing failure
#[instrument(skip_all)]
pub fn login(
    config: &Config,
    validator: &dyn CredentialValidator,
    username: &str,
    password: &str,
) -> Result<BearerAccessRefreshToken, GatewayError> {
    let principal = validator
        .authenticate(username, password)?
        .ok_or_else(|| {
            tracing::info!(
                target: "gateway.token",
                username_hash = %observability::hash_for_correlation(username),
                "Login rejected"
            );
            observability::metrics::record_login_attempt("rejected");
            GatewayError::CredentialsRejected
        })?;

    let pair = issue_token_pair(config, &principal)?;

    tracing::info!(
        target: "gateway.token",
        username_hash = %observability::hash_for_correlation(&principal.username),
        "Login succeeded, token pair issued"
    );
    observability::metrics::record_login_attempt("success");
    observability::metrics::record_token_issuance("login");

    Ok(pair)
}

/// Issue an access/refresh token pair for an authenticated principal.
///
/// Both tokens are stamped `iat = now`; the access token expires after
/// the configured access TTL, the refresh token after the (longer)
/// refresh TTL. The refresh token additionally carries a unique `jti`.
///
/// # Errors
///
/// - `InvalidPrincipal` - the principal has an empty username
/// - `Crypto` - signing failure
pub fn issue_token_pair(
    config: &Config,
    principal: &Principal,
) -> Result<BearerAccessRefreshToken, GatewayError> {
    if principal.username.trim().is_empty() {
        tracing::error!(target: "gateway.token", "Validator produced a principal with no username");
        return Err(GatewayError::InvalidPrincipal(
            "empty username".to_string(),
        ));
    }

    let now = Utc::now().timestamp();

    let access_claims = TokenClaims {
        sub: principal.username.clone(),
        iat: now,
        exp: now + config.access_ttl_seconds,
        token_type: TokenKind::Access,
        roles: principal.roles.clone(),
        jti: None,
    };

    let refresh_claims = TokenClaims {
        sub: principal.username.clone(),
        iat: now,
        exp: now + config.refresh_ttl_seconds,
        token_type: TokenKind::Refresh,
        roles: principal.roles.clone(),
        jti: Some(Uuid::new_v4().to_string()),
    };

    let access_token = crypto::sign_claims(&access_claims, &config.signing_key, &config.key_id)?;
    let refresh_token = crypto::sign_claims(&refresh_claims, &config.signing_key, &config.key_id)?;

    Ok(BearerAccessRefreshToken {
        username: principal.username.clone(),
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_ttl_seconds,
    })
}

/// Classify a presented token as of time `now`.
///
/// Validation is a pure function of the token, the key and the clock:
/// the same inputs always produce the same outcome, and validating does
/// not consume or alter the token.
#[must_use]
pub fn validate_token(token: &str, key: &[u8], now: i64) -> ValidationOutcome {
    match crypto::decode_claims(token, key) {
        Err(DecodeError::MalformedSignature) => ValidationOutcome::MalformedSignature,
        Err(DecodeError::MissingClaim(claim)) => ValidationOutcome::MissingClaim(claim),
        Ok(claims) if claims.is_expired_at(now) => ValidationOutcome::Expired,
        Ok(claims) => ValidationOutcome::Valid(claims),
    }
}

/// Redeem a refresh token for a fresh token pair.
///
/// Every redemption failure collapses to `InvalidGrant`: a forged,
/// expired, malformed or wrong-kind token must be indistinguishable to
/// the caller. The specific reason goes to debug logs and metrics.
///
/// Redemption rotates the pair: the new refresh token gets a new `jti`
/// and a full refresh TTL.
///
/// # Errors
///
/// - `InvalidGrant` - token not usable as a refresh credential
/// - `Crypto` - signing failure while minting the new pair
#[instrument(skip_all)]
pub fn redeem_refresh_token(
    config: &Config,
    token: &str,
) -> Result<BearerAccessRefreshToken, GatewayError> {
    let now = Utc::now().timestamp();
    let outcome = validate_token(token, &config.signing_key, now);

    let claims = match outcome {
        ValidationOutcome::Valid(claims) => claims,
        other => {
            tracing::debug!(target: "gateway.token", reason = other.label(), "Refresh token rejected");
            observability::metrics::record_refresh_redemption(other.label());
            return Err(GatewayError::InvalidGrant);
        }
    };

    if claims.token_type != TokenKind::Refresh {
        tracing::debug!(target: "gateway.token", "Access token presented for redemption");
        observability::metrics::record_refresh_redemption("wrong_kind");
        return Err(GatewayError::InvalidGrant);
    }

    let principal = Principal {
        username: claims.sub,
        roles: claims.roles,
    };

    let pair = issue_token_pair(config, &principal)?;

    tracing::info!(
        target: "gateway.token",
        username_hash = %observability::hash_for_correlation(&principal.username),
        "Refresh token redeemed, new pair issued"
    );
    observability::metrics::record_refresh_redemption("success");
    observability::metrics::record_token_issuance("refresh");

    Ok(pair)
}
