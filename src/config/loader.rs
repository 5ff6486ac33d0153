//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `config.toml`, layering environment variables on
//! top, validating all parameters, and providing clear error messages
//! for misconfiguration.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;
use crate::error::ConfigError;

/// Config file read when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Env keys for each overridable setting. First key present wins; the
/// trailing names are accepted for older deployments.
const SYMBOL_KEYS: &[&str] = &["SYMBOL", "TRADING_SYMBOL"];
const LEVERAGE_KEYS: &[&str] = &["LEVERAGE"];
const NOTIONAL_KEYS: &[&str] = &["TRADE_SIZE_NOTIONAL", "TRADE_SIZE_USDT"];
const SLEEP_KEYS: &[&str] = &["SLEEP_SECONDS"];
const BUFFER_KEYS: &[&str] = &["BREAKOUT_BUFFER_PERCENT", "BREAKOUT_BUFFER"];
const DRY_RUN_KEYS: &[&str] = &["DRY_RUN"];
const BASE_URL_KEYS: &[&str] = &["API_BASE_URL"];

/// Highest leverage Binance offers on any USD-M contract.
const MAX_LEVERAGE: u8 = 125;
/// Binance kline endpoint limit.
const MAX_CANDLE_LIMIT: u16 = 1500;
const MAX_QUANTITY_PRECISION: u32 = 8;

/// Load configuration from disk and the process environment.
///
/// `path = None` reads `config.toml` if it exists and falls back to
/// defaults otherwise; an explicit path must exist.
///
/// # Errors
/// Returns `ConfigError` if:
/// - An explicit config file doesn't exist or can't be read
/// - TOML parsing fails
/// - An environment override doesn't parse
/// - Validation rules are violated
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
  load_config_with(path, |key| std::env::var(key).ok())
}

/// `load_config` with an injectable environment lookup.
pub fn load_config_with<F>(path: Option<&str>, env: F) -> Result<AppConfig, ConfigError>
where
  F: Fn(&str) -> Option<String>,
{
  let mut config = match path {
    Some(explicit) => read_file(Path::new(explicit))?,
    None => {
      let default = Path::new(DEFAULT_CONFIG_PATH);
      if default.exists() {
        read_file(default)?
      } else {
        AppConfig::default()
      }
    }
  };

  apply_env_overrides(&mut config, &env)?;
  validate_config(&config)?;

  Ok(config)
}

/// Log the effective settings. Call once the subscriber is installed.
pub fn log_config_summary(config: &AppConfig) {
  info!(
    symbol = %config.trading.symbol,
    leverage = config.trading.leverage,
    notional = %config.trading.trade_size_notional,
    buffer_pct = %config.trading.breakout_buffer_percent,
    sleep_seconds = config.trading.sleep_seconds,
    dry_run = config.bot.dry_run,
    "Configuration loaded successfully"
  );
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.display().to_string(),
    source,
  })?;
  parse_config(&content)
}

/// Parse a TOML document. Missing sections and keys take defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
  Ok(toml::from_str(content)?)
}

/// Overlay environment variables onto a parsed config.
pub fn apply_env_overrides<F>(config: &mut AppConfig, env: &F) -> Result<(), ConfigError>
where
  F: Fn(&str) -> Option<String>,
{
  if let Some((_, symbol)) = lookup(env, SYMBOL_KEYS) {
    config.trading.symbol = symbol.to_uppercase();
  }
  if let Some((key, raw)) = lookup(env, LEVERAGE_KEYS) {
    config.trading.leverage = parse_var(key, &raw)?;
  }
  if let Some((key, raw)) = lookup(env, NOTIONAL_KEYS) {
    config.trading.trade_size_notional = parse_var::<Decimal>(key, &raw)?;
  }
  if let Some((key, raw)) = lookup(env, SLEEP_KEYS) {
    config.trading.sleep_seconds = parse_var(key, &raw)?;
  }
  if let Some((key, raw)) = lookup(env, BUFFER_KEYS) {
    config.trading.breakout_buffer_percent = parse_var::<Decimal>(key, &raw)?;
  }
  if let Some((key, raw)) = lookup(env, DRY_RUN_KEYS) {
    config.bot.dry_run = parse_bool(key, &raw)?;
  }
  if let Some((_, url)) = lookup(env, BASE_URL_KEYS) {
    config.api.base_url = url;
  }
  Ok(())
}

/// First non-empty value among `keys`, with the key that supplied it.
fn lookup<F>(env: &F, keys: &[&'static str]) -> Option<(&'static str, String)>
where
  F: Fn(&str) -> Option<String>,
{
  keys.iter().find_map(|&key| {
    env(key)
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
      .map(|v| (key, v))
  })
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: Display,
{
  raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
    key,
    value: raw.to_string(),
    reason: e.to_string(),
  })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
  match raw.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(ConfigError::InvalidValue {
      key,
      value: raw.to_string(),
      reason: "expected a boolean".to_string(),
    }),
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
  let t = &config.trading;

  ensure(
    !t.symbol.is_empty() && t.symbol.chars().all(|c| c.is_ascii_alphanumeric()),
    || format!("symbol must be non-empty alphanumeric, got {:?}", t.symbol),
  )?;
  ensure((1..=MAX_LEVERAGE).contains(&t.leverage), || {
    format!("leverage must be in [1, {MAX_LEVERAGE}], got {}", t.leverage)
  })?;
  ensure(t.trade_size_notional > Decimal::ZERO, || {
    format!("trade_size_notional must be positive, got {}", t.trade_size_notional)
  })?;
  ensure(
    t.breakout_buffer_percent >= Decimal::ZERO && t.breakout_buffer_percent < Decimal::ONE_HUNDRED,
    || format!("breakout_buffer_percent must be in [0, 100), got {}", t.breakout_buffer_percent),
  )?;
  ensure((1..=MAX_CANDLE_LIMIT).contains(&t.candle_limit), || {
    format!("candle_limit must be in [1, {MAX_CANDLE_LIMIT}], got {}", t.candle_limit)
  })?;
  ensure(t.quantity_precision <= MAX_QUANTITY_PRECISION, || {
    format!("quantity_precision must be at most {MAX_QUANTITY_PRECISION}, got {}", t.quantity_precision)
  })?;
  ensure(!t.quote_asset.is_empty(), || "quote_asset must not be empty".to_string())?;

  let api = &config.api;
  ensure(api.base_url.starts_with("http"), || {
    format!("api.base_url must be an http(s) URL, got {:?}", api.base_url)
  })?;
  ensure(api.timeout_ms > 0, || "api.timeout_ms must be positive".to_string())?;
  ensure(api.requests_per_minute > 0, || {
    "api.requests_per_minute must be positive".to_string()
  })?;

  Ok(())
}

fn ensure(cond: bool, msg: impl FnOnce() -> String) -> Result<(), ConfigError> {
  if cond { Ok(()) } else { Err(ConfigError::Invalid(msg())) }
}
