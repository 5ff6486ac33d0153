//! Binance Authentication - HMAC-SHA256 Request Signing
//!
//! Signs every private futures request per the Binance USD-M API:
//! the full query string (including `timestamp` and `recvWindow`) is
//! MACed with the API secret and appended as `signature`, hex encoded.
//! Credentials come from environment variables (API_KEY, API_SECRET).

use chrono::Utc;

use crate::error::ConfigError;

/// Env keys for the API key; the second is accepted for older deployments.
const API_KEY_VARS: &[&str] = &["API_KEY", "BINANCE_API_KEY"];
/// Env keys for the API secret.
const API_SECRET_VARS: &[&str] = &["API_SECRET", "BINANCE_SECRET_KEY"];

/// Binance API credentials.
///
/// The secret never leaves this struct: it is only used to compute
/// signatures, and `Debug` redacts it.
#[derive(Clone)]
pub struct ApiCredentials {
    /// Sent as the `X-MBX-APIKEY` header.
    api_key: String,
    /// HMAC key (never sent in headers).
    api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Load credentials from environment variables.
    ///
    /// Both must be set and non-empty. These MUST be set in `.env`
    /// or the process environment (never committed to git).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `from_env` with an injectable lookup.
    pub fn from_lookup<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let find = |keys: &[&'static str]| {
            keys.iter()
                .find_map(|&k| env(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
                .ok_or(ConfigError::MissingCredential(keys[0]))
        };
        Ok(Self {
            api_key: find(API_KEY_VARS)?,
            api_secret: find(API_SECRET_VARS)?,
        })
    }

    /// Get the API key for request headers.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Hex-encoded HMAC-SHA256 of `query` under the API secret.
    pub fn sign(&self, query: &str) -> String {
        hex::encode(hmac_sha256::HMAC::mac(query.as_bytes(), self.api_secret.as_bytes()))
    }

    /// Current Unix timestamp in milliseconds (the `timestamp` parameter).
    pub fn timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
