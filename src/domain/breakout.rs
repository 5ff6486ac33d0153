//! Range-breakout signal.
//!
//! Builds a band from the highest high and lowest low of the recent
//! window, widened by a percentage buffer, and decides whether the
//! latest close has escaped it. Entries are sized from a fixed notional.
//!
//! The engine is a pure function of its inputs: it holds only its
//! immutable parameters and never touches I/O, so every decision can be
//! reproduced from the candles and position that produced it.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::candle::CandleWindow;
use super::trade::{PositionState, TradeSide};

/// Default quantity precision (decimal places).
pub const DEFAULT_QUANTITY_PRECISION: u32 = 4;

const ONE_HUNDRED: Decimal = dec!(100);

/// Long/short trigger levels for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakoutThresholds {
    /// Price must close above this to go long.
    pub long: Decimal,
    /// Price must close below this to go short.
    pub short: Decimal,
}

impl BreakoutThresholds {
    /// `long = max_high * (1 + buffer/100)`, `short = min_low * (1 - buffer/100)`.
    pub fn from_window(window: &CandleWindow, buffer_percent: Decimal) -> Self {
        let buffer = buffer_percent / ONE_HUNDRED;
        Self {
            long: window.max_high() * (Decimal::ONE + buffer),
            short: window.min_low() * (Decimal::ONE - buffer),
        }
    }
}

/// Why no order is placed this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoActionReason {
    /// A position is already open on the symbol.
    PositionOpen,
    /// Price is inside the band.
    WithinBand,
    /// Notional / price rounds to zero at the configured precision.
    QuantityRoundsToZero,
}

impl NoActionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PositionOpen => "position_open",
            Self::WithinBand => "within_band",
            Self::QuantityRoundsToZero => "quantity_rounds_to_zero",
        }
    }
}

impl std::fmt::Display for NoActionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDecision {
    NoAction(NoActionReason),
    EnterLong { quantity: Decimal },
    EnterShort { quantity: Decimal },
}

impl TradeDecision {
    /// Order side and quantity to submit, if any.
    pub const fn entry(&self) -> Option<(TradeSide, Decimal)> {
        match self {
            Self::NoAction(_) => None,
            Self::EnterLong { quantity } => Some((TradeSide::Buy, *quantity)),
            Self::EnterShort { quantity } => Some((TradeSide::Sell, *quantity)),
        }
    }
}

/// Everything computed for one cycle: the snapshot that gets logged plus
/// the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub current_price: Decimal,
    pub max_high: Decimal,
    pub min_low: Decimal,
    pub thresholds: BreakoutThresholds,
    pub decision: TradeDecision,
}

/// Breakout decision engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakoutEngine {
    /// Band widening in percent (0.05 = 0.05 %).
    buffer_percent: Decimal,
    /// Quote-currency size of every entry.
    notional: Decimal,
    /// Decimal places kept on order quantities.
    quantity_precision: u32,
}

impl BreakoutEngine {
    pub const fn new(buffer_percent: Decimal, notional: Decimal, quantity_precision: u32) -> Self {
        Self {
            buffer_percent,
            notional,
            quantity_precision,
        }
    }

    pub const fn buffer_percent(&self) -> Decimal {
        self.buffer_percent
    }

    pub const fn notional(&self) -> Decimal {
        self.notional
    }

    /// Evaluate one window against the current position.
    ///
    /// Long is checked before short. Both can only hold at once on a
    /// contradictory window (highs below lows).
    pub fn evaluate(&self, window: &CandleWindow, position: &PositionState) -> Evaluation {
        let current_price = window.last_close();
        let thresholds = BreakoutThresholds::from_window(window, self.buffer_percent);

        let decision = if !position.is_flat() {
            TradeDecision::NoAction(NoActionReason::PositionOpen)
        } else if current_price > thresholds.long {
            self.size_entry(current_price)
                .map_or(TradeDecision::NoAction(NoActionReason::QuantityRoundsToZero), |quantity| {
                    TradeDecision::EnterLong { quantity }
                })
        } else if current_price < thresholds.short {
            self.size_entry(current_price)
                .map_or(TradeDecision::NoAction(NoActionReason::QuantityRoundsToZero), |quantity| {
                    TradeDecision::EnterShort { quantity }
                })
        } else {
            TradeDecision::NoAction(NoActionReason::WithinBand)
        };

        Evaluation {
            current_price,
            max_high: window.max_high(),
            min_low: window.min_low(),
            thresholds,
            decision,
        }
    }

    /// Decide on the window alone, discarding the snapshot.
    pub fn decide(&self, window: &CandleWindow, position: &PositionState) -> TradeDecision {
        self.evaluate(window, position).decision
    }

    /// `notional / price`, rounded half-to-even. `None` if the result is
    /// not strictly positive or the division is undefined.
    pub fn size_entry(&self, price: Decimal) -> Option<Decimal> {
        if price <= Decimal::ZERO {
            return None;
        }
        let quantity = self
            .notional
            .checked_div(price)?
            .round_dp_with_strategy(self.quantity_precision, RoundingStrategy::MidpointNearestEven);
        (quantity > Decimal::ZERO).then_some(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use chrono::DateTime;

    fn window(highs: &[Decimal], lows: &[Decimal], last_close: Decimal) -> CandleWindow {
        let n = highs.len();
        let candles = highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&high, &low))| Candle {
                open_time: DateTime::from_timestamp(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                open: low,
                high,
                low,
                close: if i + 1 == n { last_close } else { (high + low) / dec!(2) },
                volume: dec!(10),
            })
            .collect();
        CandleWindow::new(candles).unwrap()
    }

    fn scenario(last_close: Decimal) -> CandleWindow {
        window(
            &[dec!(100), dec!(101), dec!(102)],
            &[dec!(95), dec!(94), dec!(93)],
            last_close,
        )
    }

    fn engine() -> BreakoutEngine {
        BreakoutEngine::new(dec!(0.05), dec!(10), DEFAULT_QUANTITY_PRECISION)
    }

    #[test]
    fn test_thresholds_from_window() {
        let t = BreakoutThresholds::from_window(&scenario(dec!(99)), dec!(0.05));
        assert_eq!(t.long, dec!(102.051));
        assert_eq!(t.short, dec!(92.9535));
    }

    #[test]
    fn test_long_breakout_enters_long() {
        let eval = engine().evaluate(&scenario(dec!(107)), &PositionState::Flat);
        assert_eq!(eval.current_price, dec!(107));
        assert_eq!(eval.max_high, dec!(102));
        assert_eq!(eval.decision, TradeDecision::EnterLong { quantity: dec!(0.0935) });
        assert_eq!(eval.decision.entry(), Some((TradeSide::Buy, dec!(0.0935))));
    }

    #[test]
    fn test_short_breakout_enters_short() {
        let eval = engine().evaluate(&scenario(dec!(92)), &PositionState::Flat);
        assert_eq!(eval.min_low, dec!(93));
        assert_eq!(eval.decision, TradeDecision::EnterShort { quantity: dec!(0.1087) });
        assert_eq!(eval.decision.entry(), Some((TradeSide::Sell, dec!(0.1087))));
    }

    #[test]
    fn test_price_inside_band_holds() {
        let decision = engine().decide(&scenario(dec!(99)), &PositionState::Flat);
        assert_eq!(decision, TradeDecision::NoAction(NoActionReason::WithinBand));
        assert_eq!(decision.entry(), None);
    }

    #[test]
    fn test_open_position_blocks_entry() {
        let e = engine();
        let long = PositionState::Long(dec!(0.05));
        let short = PositionState::Short(dec!(-0.05));
        for close in [dec!(107), dec!(92), dec!(99)] {
            assert_eq!(
                e.decide(&scenario(close), &long),
                TradeDecision::NoAction(NoActionReason::PositionOpen)
            );
            assert_eq!(
                e.decide(&scenario(close), &short),
                TradeDecision::NoAction(NoActionReason::PositionOpen)
            );
        }
    }

    #[test]
    fn test_price_exactly_on_threshold_holds() {
        // Strict inequality on both sides.
        let decision = engine().decide(&scenario(dec!(102.051)), &PositionState::Flat);
        assert_eq!(decision, TradeDecision::NoAction(NoActionReason::WithinBand));
        let decision = engine().decide(&scenario(dec!(92.9535)), &PositionState::Flat);
        assert_eq!(decision, TradeDecision::NoAction(NoActionReason::WithinBand));
    }

    #[test]
    fn test_tiny_quantity_degrades_to_no_action() {
        let e = BreakoutEngine::new(dec!(0.05), dec!(0.001), DEFAULT_QUANTITY_PRECISION);
        let decision = e.decide(&scenario(dec!(107)), &PositionState::Flat);
        assert_eq!(decision, TradeDecision::NoAction(NoActionReason::QuantityRoundsToZero));
    }

    #[test]
    fn test_contradictory_window_prefers_long() {
        // Highs below lows: price is simultaneously above the long band and
        // below the short band.
        let w = window(&[dec!(50), dec!(50)], &[dec!(200), dec!(200)], dec!(100));
        let t = BreakoutThresholds::from_window(&w, dec!(0.05));
        assert!(dec!(100) > t.long && dec!(100) < t.short);
        assert_eq!(
            engine().decide(&w, &PositionState::Flat),
            TradeDecision::EnterLong { quantity: dec!(0.1) }
        );
    }

    #[test]
    fn test_zero_buffer_uses_raw_range() {
        let e = BreakoutEngine::new(Decimal::ZERO, dec!(10), 4);
        let t = BreakoutThresholds::from_window(&scenario(dec!(99)), e.buffer_percent());
        assert_eq!(t.long, dec!(102));
        assert_eq!(t.short, dec!(93));
        assert_eq!(
            e.decide(&scenario(dec!(102.01)), &PositionState::Flat),
            TradeDecision::EnterLong { quantity: dec!(0.098) }
        );
    }

    #[test]
    fn test_size_entry_precision_and_guards() {
        let e = BreakoutEngine::new(dec!(0.05), dec!(10), 2);
        assert_eq!(e.size_entry(dec!(3)), Some(dec!(3.33)));
        assert_eq!(e.size_entry(Decimal::ZERO), None);
        assert_eq!(e.size_entry(dec!(-1)), None);
        assert_eq!(e.size_entry(dec!(100000)), None);
        assert_eq!(e.notional(), dec!(10));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let e = engine();
        let w = scenario(dec!(107));
        assert_eq!(e.evaluate(&w, &PositionState::Flat), e.evaluate(&w, &PositionState::Flat));
    }
}
