//! Binance HTTP Client - Rate-limited REST API Client
//!
//! Wraps reqwest with client-side rate limiting, request signing, and
//! retries for all USD-M futures REST interactions.
//!
//! Only GETs are retried. A POST that timed out may still have reached
//! the matching engine, so order and leverage calls are sent once.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::auth::ApiCredentials;
use super::types::ApiErrorBody;
use crate::config::ApiConfig;
use crate::error::ExchangeError;

/// Header carrying the API key on signed requests.
const API_KEY_HEADER: &str = "X-MBX-APIKEY";
/// Longest response body quoted in an error.
const MAX_ERROR_BODY: usize = 256;

type BinanceRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Configuration for the Binance HTTP client.
#[derive(Debug, Clone)]
pub struct BinanceClientConfig {
    /// Base URL for the futures API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// `recvWindow` for signed requests, in milliseconds.
    pub recv_window_ms: u64,
    /// Maximum retries on transient errors (GET only).
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub retry_base_delay: Duration,
    /// Client-side request budget per minute.
    pub requests_per_minute: u32,
}

impl Default for BinanceClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for BinanceClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(api.timeout_ms),
            recv_window_ms: api.recv_window_ms,
            max_retries: api.max_retries,
            retry_base_delay: Duration::from_millis(api.retry_base_delay_ms),
            requests_per_minute: api.requests_per_minute,
        }
    }
}

/// Rate-limited HTTP client for the Binance USD-M futures API.
pub struct BinanceClient {
    /// Underlying HTTP client.
    http: Client,
    /// API key and signing secret.
    credentials: Arc<ApiCredentials>,
    /// Client configuration.
    config: BinanceClientConfig,
    /// Request budget shared by every call.
    limiter: BinanceRateLimiter,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(credentials: Arc<ApiCredentials>, config: BinanceClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to build HTTP client")?;

        let rpm = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_minute(rpm));

        Ok(Self {
            http,
            credentials,
            config,
            limiter,
        })
    }

    /// Unsigned GET (market data).
    pub async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        self.execute(Method::GET, path, params, false).await
    }

    /// Signed GET (account data).
    pub async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        self.execute(Method::GET, path, params, true).await
    }

    /// Signed POST. Never retried.
    pub async fn post_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        self.execute(Method::POST, path, params, true).await
    }

    /// Execute request with signing, rate limiting, and retries.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        signed: bool,
    ) -> Result<T, ExchangeError> {
        let attempts = if method == Method::GET {
            self.config.max_retries + 1
        } else {
            1
        };

        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis(), path, "Retrying request");
                sleep(delay).await;
            }

            self.limiter.until_ready().await;

            // Rebuilt per attempt so retried signed GETs carry a fresh timestamp.
            let url = self.build_url(path, params, signed)?;
            let mut request = self.http.request(method.clone(), url);
            if signed {
                request = request.header(API_KEY_HEADER, self.credentials.api_key());
            }

            match Self::send(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    warn!(error = %e, attempt, path, "Transient exchange error");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ExchangeError::Transport("max retries exceeded".to_string())))
    }

    /// Full URL with query string, plus `timestamp`, `recvWindow` and
    /// `signature` when signed.
    fn build_url(
        &self,
        path: &str,
        params: &[(&str, String)],
        signed: bool,
    ) -> Result<Url, ExchangeError> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|e| ExchangeError::Transport(format!("invalid URL for {path}: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if signed {
                query
                    .append_pair("recvWindow", &self.config.recv_window_ms.to_string())
                    .append_pair("timestamp", &ApiCredentials::timestamp_ms().to_string());
            }
        }

        if signed {
            let signature = self.credentials.sign(url.query().unwrap_or_default());
            url.query_pairs_mut().append_pair("signature", &signature);
        }

        Ok(url)
    }

    /// Send one request and decode the body or the exchange error.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ExchangeError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

/// Map a status and body to the typed result.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ExchangeError> {
    if status.is_success() {
        return serde_json::from_str(body)
            .map_err(|e| ExchangeError::Decode(format!("{e}: {}", truncate(body))));
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
        return Err(ExchangeError::RateLimited {
            status: status.as_u16(),
        });
    }

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => Err(ExchangeError::Api {
            code: err.code,
            message: err.msg,
        }),
        Err(_) => Err(ExchangeError::Http {
            status: status.as_u16(),
            body: truncate(body).to_string(),
        }),
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
