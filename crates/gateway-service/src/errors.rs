use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message used for every 401 caused by a bad or missing token.
///
/// Clients must not be able to tell an expired token from a forged one,
/// so all token failures share this text. The precise reason goes to
/// debug-level logs only.
const GENERIC_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Login credentials did not match any known user.
    #[error("Invalid credentials")]
    CredentialsRejected,

    /// No bearer token on a protected request.
    #[error("{GENERIC_TOKEN_MESSAGE}")]
    TokenAbsent,

    /// Token failed structural or signature checks.
    #[error("{GENERIC_TOKEN_MESSAGE}")]
    TokenMalformed,

    /// Token verified but its lifetime has elapsed.
    #[error("{GENERIC_TOKEN_MESSAGE}")]
    TokenExpired,

    /// Token verified but a required claim is missing.
    #[error("{GENERIC_TOKEN_MESSAGE}")]
    TokenMissingClaim(String),

    /// A token of the wrong kind was presented (refresh token at the
    /// request guard, access token at the redemption endpoint).
    #[error("{GENERIC_TOKEN_MESSAGE}")]
    TokenWrongKind,

    /// Redemption endpoint received a grant_type it does not support.
    #[error("Unsupported grant type")]
    UnsupportedGrantType,

    /// Refresh token could not be redeemed.
    #[error("Refresh token is invalid")]
    InvalidGrant,

    /// Credential validation succeeded but produced an unusable principal.
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Internal server error.
    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Flat error body for the OAuth-style refresh endpoint, matching the
/// wire format refresh clients expect.
#[derive(Serialize)]
struct OAuthErrorResponse {
    error: &'static str,
    error_description: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            // All authentication failures render identically: same status,
            // same body, same challenge header.
            GatewayError::CredentialsRejected
            | GatewayError::TokenAbsent
            | GatewayError::TokenMalformed
            | GatewayError::TokenExpired
            | GatewayError::TokenMissingClaim(_)
            | GatewayError::TokenWrongKind => unauthorized_response(),

            GatewayError::UnsupportedGrantType => oauth_error_response(
                "unsupported_grant_type",
                "grant_type must be refresh_token".to_string(),
            ),

            GatewayError::InvalidGrant => {
                oauth_error_response("invalid_grant", "Refresh token is invalid".to_string())
            }

            GatewayError::InvalidPrincipal(_) | GatewayError::Crypto(_) => internal_response(),

            GatewayError::Internal => internal_response(),
        }
    }
}

fn unauthorized_response() -> Response {
    let body = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: GENERIC_TOKEN_MESSAGE.to_string(),
        },
    };

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(body),
    )
        .into_response()
}

fn oauth_error_response(error: &'static str, error_description: String) -> Response {
    let body = OAuthErrorResponse {
        error,
        error_description,
    };

    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn internal_response() -> Response {
    let body = ErrorResponse {
        error: ErrorDetail {
            code: "INTERNAL_ERROR".to_string(),
            message: "An internal error occurred".to_string(),
        },
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
