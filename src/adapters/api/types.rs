//! Binance USD-M Futures Request/Response Types
//!
//! Serialization types for the REST endpoints the bot touches.
//! Binance encodes prices and quantities as JSON strings; they are
//! deserialized straight into `Decimal`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::candle::Candle;
use crate::domain::trade::{LeverageAck, OrderConfirmation, PositionState};
use crate::error::ExchangeError;

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Negative Binance error code, e.g. -2019 (margin insufficient).
    pub code: i64,
    /// Human-readable message.
    pub msg: String,
}

/// One entry of `GET /fapi/v2/positionRisk`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRiskEntry {
    pub symbol: String,
    /// Signed position size.
    pub position_amt: Decimal,
    /// `BOTH` in one-way mode, `LONG`/`SHORT` in hedge mode.
    #[serde(default)]
    pub position_side: Option<String>,
}

/// One entry of `GET /fapi/v2/balance`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub asset: String,
    /// Wallet balance.
    pub balance: Decimal,
    #[serde(default)]
    pub available_balance: Option<Decimal>,
}

/// Response of `POST /fapi/v1/leverage`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageResponse {
    pub symbol: String,
    pub leverage: u8,
    /// Decimal string, or `INF` on some contracts.
    #[serde(default)]
    pub max_notional_value: Option<String>,
}

/// Response of `POST /fapi/v1/order` (ACK or RESULT).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i64,
    pub client_order_id: String,
    pub status: String,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
}

impl From<OrderResponse> for OrderConfirmation {
    fn from(r: OrderResponse) -> Self {
        Self {
            order_id: r.order_id.to_string(),
            client_order_id: r.client_order_id,
            status: r.status,
            executed_qty: r.executed_qty.unwrap_or_default(),
            avg_price: r.avg_price.filter(|p| !p.is_zero()),
        }
    }
}

impl From<LeverageResponse> for LeverageAck {
    fn from(r: LeverageResponse) -> Self {
        Self {
            max_notional: r.max_notional_value.and_then(|v| v.parse().ok()),
            symbol: r.symbol,
            leverage: r.leverage,
        }
    }
}

/// First entry with a non-zero amount decides the position; none means flat.
pub fn position_from_entries(entries: &[PositionRiskEntry]) -> PositionState {
    entries
        .iter()
        .find(|e| !e.position_amt.is_zero())
        .map_or(PositionState::Flat, |e| {
            PositionState::from_signed_amount(e.position_amt)
        })
}

/// Wallet balance of `asset`, if the account lists it.
pub fn balance_of(entries: &[BalanceEntry], asset: &str) -> Option<Decimal> {
    entries.iter().find(|b| b.asset == asset).map(|b| b.balance)
}

/// Decode one kline row:
/// `[openTime, open, high, low, close, volume, closeTime, ...]`.
pub fn candle_from_row(row: &[Value]) -> Result<Candle, ExchangeError> {
    if row.len() < 6 {
        return Err(ExchangeError::Decode(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let open_ms = row[0]
        .as_i64()
        .ok_or_else(|| ExchangeError::Decode("kline open time is not an integer".to_string()))?;
    let open_time = DateTime::from_timestamp_millis(open_ms)
        .ok_or_else(|| ExchangeError::Decode(format!("kline open time {open_ms} out of range")))?;

    let candle = Candle {
        open_time,
        open: decimal_field(&row[1], "open")?,
        high: decimal_field(&row[2], "high")?,
        low: decimal_field(&row[3], "low")?,
        close: decimal_field(&row[4], "close")?,
        volume: decimal_field(&row[5], "volume")?,
    };

    if candle.low <= Decimal::ZERO || candle.close <= Decimal::ZERO || candle.high <= Decimal::ZERO {
        return Err(ExchangeError::Decode(format!(
            "kline at {open_ms} has non-positive prices"
        )));
    }

    Ok(candle)
}

/// Kline close time (`row[6]`, milliseconds).
pub fn kline_close_time(row: &[Value]) -> Result<DateTime<Utc>, ExchangeError> {
    let close_ms = row
        .get(6)
        .and_then(Value::as_i64)
        .ok_or_else(|| ExchangeError::Decode("kline close time missing or not an integer".to_string()))?;
    DateTime::from_timestamp_millis(close_ms)
        .ok_or_else(|| ExchangeError::Decode(format!("kline close time {close_ms} out of range")))
}

/// Decode kline rows, dropping any bar that has not closed by `now`,
/// and keep the most recent `limit` of the rest.
pub fn closed_candles(
    rows: &[Vec<Value>],
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Candle>, ExchangeError> {
    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        if kline_close_time(row)? >= now {
            continue;
        }
        candles.push(candle_from_row(row)?);
    }
    let excess = candles.len().saturating_sub(limit);
    candles.drain(..excess);
    Ok(candles)
}

fn decimal_field(value: &Value, name: &str) -> Result<Decimal, ExchangeError> {
    value
        .as_str()
        .ok_or_else(|| ExchangeError::Decode(format!("kline {name} is not a string")))?
        .parse()
        .map_err(|e| ExchangeError::Decode(format!("kline {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kline_rows_decode() {
        let json = r#"[
            [1700000000000, "2000.10", "2001.50", "1999.00", "2000.75", "123.456", 1700000059999, "0", 10, "0", "0", "0"],
            [1700000060000, "2000.75", "2003.00", "2000.00", "2002.25", "98.1", 1700000119999, "0", 8, "0", "0", "0"]
        ]"#;
        let rows: Vec<Vec<Value>> = serde_json::from_str(json).unwrap();
        let candles: Vec<Candle> = rows.iter().map(|r| candle_from_row(r).unwrap()).collect();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].high, dec!(2001.50));
        assert_eq!(candles[0].low, dec!(1999.00));
        assert_eq!(candles[1].close, dec!(2002.25));
        assert_eq!(candles[1].open_time.timestamp_millis(), 1_700_000_060_000);
    }

    #[test]
    fn test_kline_row_too_short() {
        let row: Vec<Value> = serde_json::from_str(r#"[1700000000000, "1", "2"]"#).unwrap();
        assert!(matches!(candle_from_row(&row), Err(ExchangeError::Decode(_))));
    }

    #[test]
    fn test_kline_row_bad_number() {
        let row: Vec<Value> =
            serde_json::from_str(r#"[1700000000000, "1", "abc", "1", "1", "1"]"#).unwrap();
        assert!(matches!(candle_from_row(&row), Err(ExchangeError::Decode(_))));
    }

    #[test]
    fn test_kline_row_zero_price_rejected() {
        let row: Vec<Value> =
            serde_json::from_str(r#"[1700000000000, "1", "2", "0", "1", "1"]"#).unwrap();
        assert!(candle_from_row(&row).is_err());
    }

    fn kline(open_ms: i64, close: &str) -> Vec<Value> {
        serde_json::json!([open_ms, "100", "101", "99", close, "5", open_ms + 59_999, "0", 3, "0", "0", "0"])
            .as_array()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_forming_bar_is_dropped() {
        let rows = vec![kline(1_700_000_000_000, "100.5"), kline(1_700_000_060_000, "100.8")];
        // Second bar closes at ...119_999; "now" sits inside it.
        let now = DateTime::from_timestamp_millis(1_700_000_090_000).unwrap();

        let candles = closed_candles(&rows, now, 15).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, dec!(100.5));
    }

    #[test]
    fn test_closed_candles_keep_most_recent_limit() {
        let rows: Vec<_> = (0..4)
            .map(|i| kline(1_700_000_000_000 + i * 60_000, &format!("10{i}")))
            .collect();
        let now = DateTime::from_timestamp_millis(1_700_000_230_000).unwrap();

        // Rows 0..=2 are closed, row 3 is forming.
        let candles = closed_candles(&rows, now, 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, dec!(101));
        assert_eq!(candles[1].close, dec!(102));
    }

    #[test]
    fn test_closed_candles_need_close_time() {
        let row: Vec<Value> =
            serde_json::from_str(r#"[1700000000000, "1", "2", "1", "1", "1"]"#).unwrap();
        let now = DateTime::from_timestamp_millis(1_800_000_000_000).unwrap();
        assert!(matches!(closed_candles(&[row], now, 15), Err(ExchangeError::Decode(_))));
    }

    #[test]
    fn test_position_risk_one_way_mode() {
        let json = r#"[{"symbol":"ETHUSDT","positionAmt":"0.000","entryPrice":"0.0","positionSide":"BOTH"}]"#;
        let entries: Vec<PositionRiskEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(position_from_entries(&entries), PositionState::Flat);
    }

    #[test]
    fn test_position_risk_hedge_mode_short() {
        let json = r#"[
            {"symbol":"ETHUSDT","positionAmt":"0.000","positionSide":"LONG"},
            {"symbol":"ETHUSDT","positionAmt":"-0.050","positionSide":"SHORT"}
        ]"#;
        let entries: Vec<PositionRiskEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(position_from_entries(&entries), PositionState::Short(dec!(-0.05)));
    }

    #[test]
    fn test_balance_lookup() {
        let json = r#"[
            {"accountAlias":"x","asset":"BNB","balance":"0.1","availableBalance":"0.1"},
            {"accountAlias":"x","asset":"USDT","balance":"152.37","availableBalance":"140.00"}
        ]"#;
        let entries: Vec<BalanceEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(balance_of(&entries, "USDT"), Some(dec!(152.37)));
        assert_eq!(balance_of(&entries, "BUSD"), None);
    }

    #[test]
    fn test_order_response_to_confirmation() {
        let json = r#"{"orderId":8389765512345,"symbol":"ETHUSDT","status":"NEW","clientOrderId":"brk-abc",
                       "price":"0","avgPrice":"0.00","origQty":"0.094","executedQty":"0","type":"MARKET","side":"BUY"}"#;
        let resp: OrderResponse = serde_json::from_str(json).unwrap();
        let conf = OrderConfirmation::from(resp);
        assert_eq!(conf.order_id, "8389765512345");
        assert_eq!(conf.client_order_id, "brk-abc");
        assert_eq!(conf.status, "NEW");
        assert_eq!(conf.executed_qty, Decimal::ZERO);
        assert_eq!(conf.avg_price, None);
    }

    #[test]
    fn test_leverage_response() {
        let json = r#"{"leverage":10,"maxNotionalValue":"1000000","symbol":"ETHUSDT"}"#;
        let ack = LeverageAck::from(serde_json::from_str::<LeverageResponse>(json).unwrap());
        assert_eq!(ack.leverage, 10);
        assert_eq!(ack.max_notional, Some(dec!(1000000)));

        let json = r#"{"leverage":20,"maxNotionalValue":"INF","symbol":"ETHUSDT"}"#;
        let ack = LeverageAck::from(serde_json::from_str::<LeverageResponse>(json).unwrap());
        assert_eq!(ack.max_notional, None);
    }

    #[test]
    fn test_error_body() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"code":-2019,"msg":"Margin is insufficient."}"#).unwrap();
        assert_eq!(body.code, -2019);
    }
}
