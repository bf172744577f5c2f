//! Metrics definitions for the token gateway.
//!
//! All metrics follow Prometheus naming conventions:
//! - `gw_` prefix for the gateway
//! - `_total` suffix for counters
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `outcome`: fixed set of validation/attempt labels
//! - `flow`: 2 values (login, refresh)
//!
//! Usernames and token contents never appear as label values.

use metrics::counter;

/// Record a login attempt
///
/// Metric: `gw_login_attempts_total`
/// Labels: `outcome` (success, rejected)
pub fn record_login_attempt(outcome: &str) {
    counter!("gw_login_attempts_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record issuance of an access/refresh token pair
///
/// Metric: `gw_token_pairs_issued_total`
/// Labels: `flow` (login, refresh)
pub fn record_token_issuance(flow: &str) {
    counter!("gw_token_pairs_issued_total",
        "flow" => flow.to_string()
    )
    .increment(1);
}

/// Record a bearer-token validation at the request guard
///
/// Metric: `gw_token_validations_total`
/// Labels: `outcome` (valid, expired, malformed_signature, missing_claim,
/// absent, wrong_kind)
pub fn record_token_validation(outcome: &str) {
    counter!("gw_token_validations_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a refresh token redemption attempt
///
/// Metric: `gw_refresh_redemptions_total`
/// Labels: `outcome` (success, expired, malformed_signature,
/// missing_claim, wrong_kind)
pub fn record_refresh_redemption(outcome: &str) {
    counter!("gw_refresh_redemptions_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
