//! Protected home endpoint.

use axum::Extension;
use common::jwt::TokenClaims;
use tracing::instrument;

/// Handler for GET /
///
/// Only reachable through the bearer guard; echoes the authenticated
/// subject as plain text.
#[instrument(skip_all, name = "gateway.handler.home")]
pub async fn home(Extension(claims): Extension<TokenClaims>) -> String {
    claims.sub
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::jwt::TokenKind;

    #[tokio::test]
    async fn test_home_returns_subject() {
        let claims = TokenClaims {
            sub: "sherlock".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            token_type: TokenKind::Access,
            roles: vec![],
            jti: None,
        };

        let body = home(Extension(claims)).await;
        assert_eq!(body, "sherlock");
    }
}
