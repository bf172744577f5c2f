//! Bearer-token guard for protected routes.
//!
//! Extracts the bearer token from the Authorization header, validates it
//! against the gateway signing key, and injects the claims into request
//! extensions for downstream handlers.

use crate::errors::GatewayError;
use crate::observability;
use crate::routes::AppState;
use crate::services::token_service::{self, ValidationOutcome};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
};
use chrono::Utc;
use common::jwt::TokenKind;
use std::sync::Arc;
use tracing::instrument;

/// Request guard that validates the bearer token.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// A missing header, a non-Bearer scheme and an empty token all count as
/// "no token presented". Whatever the failure, the response is the same
/// uniform 401 with a `WWW-Authenticate: Bearer` challenge.
#[instrument(skip_all, name = "gateway.middleware.auth")]
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, GatewayError> {
    let outcome = match bearer_token(req.headers()) {
        None => ValidationOutcome::Absent,
        Some(token) => token_service::validate_token(
            token,
            &state.config.signing_key,
            Utc::now().timestamp(),
        ),
    };

    observability::metrics::record_token_validation(outcome.label());

    let claims = match outcome {
        ValidationOutcome::Valid(claims) => claims,
        ValidationOutcome::Absent => {
            tracing::debug!(target: "gateway.middleware.auth", "No bearer token presented");
            return Err(GatewayError::TokenAbsent);
        }
        ValidationOutcome::Expired => {
            tracing::debug!(target: "gateway.middleware.auth", "Expired token presented");
            return Err(GatewayError::TokenExpired);
        }
        ValidationOutcome::MalformedSignature => {
            tracing::debug!(target: "gateway.middleware.auth", "Malformed or forged token presented");
            return Err(GatewayError::TokenMalformed);
        }
        ValidationOutcome::MissingClaim(claim) => {
            tracing::debug!(target: "gateway.middleware.auth", claim = %claim, "Token missing required claim");
            return Err(GatewayError::TokenMissingClaim(claim));
        }
    };

    // A refresh token is a redemption credential, never a request
    // credential. Logged at warn because it suggests a confused or
    // misbehaving client.
    if claims.token_type != TokenKind::Access {
        tracing::warn!(
            target: "gateway.middleware.auth",
            sub_hash = %observability::hash_for_correlation(&claims.sub),
            "Refresh token presented as access credential"
        );
        observability::metrics::record_token_validation("wrong_kind");
        return Err(GatewayError::TokenWrongKind);
    }

    // Store claims in request extensions for downstream handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Pull the bearer token out of the Authorization header.
///
/// Returns `None` for a missing header, a non-Bearer scheme, or a blank
/// token. The scheme match is exact: only `Bearer` with RFC 6750
/// capitalization is accepted, so `bearer`/`BEARER` count as no token
/// presented (and fall into the same uniform 401 as every other auth
/// failure).
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
