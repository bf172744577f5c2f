use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default access token lifetime: 1 hour.
pub const DEFAULT_ACCESS_TTL_SECONDS: i64 = 3600;

/// Default refresh token lifetime: 30 days.
pub const DEFAULT_REFRESH_TTL_SECONDS: i64 = 2_592_000;

/// Default bcrypt cost factor for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost. 4 is the bcrypt algorithm floor and is
/// only appropriate for tests.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Maximum accepted bcrypt cost. Anything above 14 makes login latency
/// unacceptable on commodity hardware.
pub const MAX_BCRYPT_COST: u32 = 14;

#[derive(Clone)]
pub struct Config {
    pub bind_address: String,

    /// Raw HS256 signing key (32 bytes, decoded from base64).
    pub signing_key: Vec<u8>,

    /// Key ID stamped into the `kid` header of every issued token.
    pub key_id: String,

    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub bcrypt_cost: u32,

    /// Email notification settings, present only when fully configured.
    pub email: Option<EmailConfig>,
}

/// Outbound email settings.
///
/// Only constructed when BOTH the API key and the sender address are set
/// and non-blank; a partial configuration disables email entirely rather
/// than failing at send time.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: SecretString,
    pub from_email: String,
}

/// Custom Debug implementation that redacts the signing key.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("signing_key", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid signing key format: {0}")]
    InvalidSigningKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let signing_key_base64 = vars
            .get("GATEWAY_SIGNING_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("GATEWAY_SIGNING_KEY".to_string()))?;

        let signing_key = general_purpose::STANDARD
            .decode(signing_key_base64)
            .map_err(ConfigError::Base64Error)?;

        if signing_key.len() != 32 {
            return Err(ConfigError::InvalidSigningKey(format!(
                "Expected 32 bytes, got {}",
                signing_key.len()
            )));
        }

        let key_id = vars
            .get("GATEWAY_KEY_ID")
            .cloned()
            .unwrap_or_else(|| "gateway-key-01".to_string());

        let access_ttl_seconds = parse_positive_i64(
            vars,
            "GATEWAY_ACCESS_TTL_SECONDS",
            DEFAULT_ACCESS_TTL_SECONDS,
        )?;
        let refresh_ttl_seconds = parse_positive_i64(
            vars,
            "GATEWAY_REFRESH_TTL_SECONDS",
            DEFAULT_REFRESH_TTL_SECONDS,
        )?;

        // A refresh token that outlives its access token is the whole point
        // of the pair.
        if refresh_ttl_seconds <= access_ttl_seconds {
            return Err(ConfigError::InvalidValue {
                var: "GATEWAY_REFRESH_TTL_SECONDS".to_string(),
                reason: format!(
                    "refresh TTL ({refresh_ttl_seconds}s) must exceed access TTL ({access_ttl_seconds}s)"
                ),
            });
        }

        let bcrypt_cost = match vars.get("GATEWAY_BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    var: "GATEWAY_BCRYPT_COST".to_string(),
                    reason: format!("not a valid integer: {raw}"),
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidValue {
                        var: "GATEWAY_BCRYPT_COST".to_string(),
                        reason: format!(
                            "cost {cost} outside allowed range {MIN_BCRYPT_COST}..={MAX_BCRYPT_COST}"
                        ),
                    });
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let email = EmailConfig::from_vars(vars);

        Ok(Config {
            bind_address,
            signing_key,
            key_id,
            access_ttl_seconds,
            refresh_ttl_seconds,
            bcrypt_cost,
            email,
        })
    }
}

impl EmailConfig {
    /// Build email settings if and only if both variables are present and
    /// non-blank.
    pub fn from_vars(vars: &HashMap<String, String>) -> Option<Self> {
        let api_key = vars
            .get("SENDGRID_APIKEY")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())?;
        let from_email = vars
            .get("SENDGRID_FROM_EMAIL")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())?;

        Some(EmailConfig {
            api_key: SecretString::from(api_key),
            from_email: from_email.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

fn parse_positive_i64(
    vars: &HashMap<String, String>,
    var: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    match vars.get(var) {
        Some(raw) => {
            let value: i64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                reason: format!("not a valid integer: {raw}"),
            })?;
            if value <= 0 {
                return Err(ConfigError::InvalidValue {
                    var: var.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            Ok(value)
        }
        None => Ok(default),
    }
}
