//! Candles and the non-empty candle window the breakout band is built from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kline interval requested from the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CandleInterval {
    #[default]
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl CandleInterval {
    /// Binance interval code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::ThreeMinutes => "3m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
        }
    }
}

impl std::fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CandleInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "3m" => Ok(Self::ThreeMinutes),
            "5m" => Ok(Self::FiveMinutes),
            "15m" => Ok(Self::FifteenMinutes),
            "1h" => Ok(Self::OneHour),
            other => Err(format!("unsupported candle interval '{other}'")),
        }
    }
}

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time.
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Base-asset volume.
    pub volume: Decimal,
}

/// Returned when trying to build a window from zero candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("candle window must contain at least one candle")]
pub struct EmptyWindow;

/// Chronologically ordered, non-empty run of candles.
///
/// The aggregate accessors all read from the same vector, so the
/// breakout band and the current price always come from one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleWindow {
    candles: Vec<Candle>,
}

impl CandleWindow {
    /// Wrap a fetched candle vector. Fails on an empty vector.
    pub fn new(candles: Vec<Candle>) -> Result<Self, EmptyWindow> {
        if candles.is_empty() {
            return Err(EmptyWindow);
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Highest high across the window.
    pub fn max_high(&self) -> Decimal {
        self.candles
            .iter()
            .map(|c| c.high)
            .fold(self.candles[0].high, Decimal::max)
    }

    /// Lowest low across the window.
    pub fn min_low(&self) -> Decimal {
        self.candles
            .iter()
            .map(|c| c.low)
            .fold(self.candles[0].low, Decimal::min)
    }

    /// Close of the most recent candle.
    pub fn last_close(&self) -> Decimal {
        self.candles[self.candles.len() - 1].close
    }

    /// Open time of the most recent candle.
    pub fn last_open_time(&self) -> DateTime<Utc> {
        self.candles[self.candles.len() - 1].open_time
    }
}
