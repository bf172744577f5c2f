use crate::errors::GatewayError;
use crate::models::{BearerAccessRefreshToken, LoginRequest, TokenRefreshRequest};
use crate::routes::AppState;
use crate::services::token_service;
use axum::{extract::State, Json};
use common::secret::ExposeSecret;
use std::sync::Arc;
use tracing::instrument;

/// Handle a login request
///
/// POST /login
///
/// Validates the submitted credentials and responds with a bearer
/// access/refresh token pair. Rejections are a uniform 401 regardless of
/// whether the username exists.
#[instrument(skip_all, name = "gateway.handler.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<BearerAccessRefreshToken>, GatewayError> {
    let pair = token_service::login(
        &state.config,
        state.credentials.as_ref(),
        &payload.username,
        payload.password.expose_secret(),
    )?;

    Ok(Json(pair))
}

/// Handle a refresh token redemption
///
/// POST /oauth/access_token
///
/// Accepts `grant_type: refresh_token` and exchanges a valid refresh
/// token for a fresh pair. Any unusable token yields 400 invalid_grant.
#[instrument(skip_all, name = "gateway.handler.refresh")]
pub async fn handle_refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRefreshRequest>,
) -> Result<Json<BearerAccessRefreshToken>, GatewayError> {
    if payload.grant_type != "refresh_token" {
        tracing::debug!(
            target: "gateway.handler.refresh",
            grant_type = %payload.grant_type,
            "Unsupported grant type"
        );
        return Err(GatewayError::UnsupportedGrantType);
    }

    let pair = token_service::redeem_refresh_token(&state.config, &payload.refresh_token)?;

    Ok(Json(pair))
}
