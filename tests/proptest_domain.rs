//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that the breakout engine keeps its
//! invariants across random candle windows and positions.

use chrono::DateTime;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use breakout_futures_bot::domain::breakout::{
    BreakoutEngine, BreakoutThresholds, DEFAULT_QUANTITY_PRECISION, NoActionReason, TradeDecision,
};
use breakout_futures_bot::domain::candle::{Candle, CandleWindow};
use breakout_futures_bot::domain::trade::PositionState;

/// Prices as cents in [1.00, 100000.00].
fn price() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// A well-formed bar: low <= close <= high.
fn bar() -> impl Strategy<Value = (Decimal, Decimal)> {
    (price(), 0i64..500_000).prop_map(|(low, spread)| (low + Decimal::new(spread, 2), low))
}

fn window_from(bars: &[(Decimal, Decimal)], last_close: Decimal) -> CandleWindow {
    let candles = bars
        .iter()
        .enumerate()
        .map(|(i, &(high, low))| Candle {
            open_time: DateTime::from_timestamp(1_700_000_000 + i as i64 * 60, 0).unwrap(),
            open: low,
            high,
            low,
            close: if i + 1 == bars.len() { last_close } else { high },
            volume: Decimal::ONE,
        })
        .collect();
    CandleWindow::new(candles).unwrap()
}

fn engine(buffer: Decimal) -> BreakoutEngine {
    BreakoutEngine::new(buffer, dec!(10), DEFAULT_QUANTITY_PRECISION)
}

// ── Position Gate ───────────────────────────────────────────

proptest! {
    /// Any open position yields NoAction, whatever the price does.
    #[test]
    fn open_position_never_trades(
        bars in prop::collection::vec(bar(), 1..30),
        last in price(),
        amount in 1i64..1_000_000,
        short in any::<bool>(),
    ) {
        let amount = Decimal::new(amount, 4);
        let position = if short {
            PositionState::Short(-amount)
        } else {
            PositionState::Long(amount)
        };
        let decision = engine(dec!(0.05)).decide(&window_from(&bars, last), &position);
        prop_assert_eq!(decision, TradeDecision::NoAction(NoActionReason::PositionOpen));
    }
}

// ── Breakout Band ───────────────────────────────────────────

proptest! {
    /// The short threshold never sits above the long threshold on a
    /// well-formed window.
    #[test]
    fn thresholds_are_ordered(
        bars in prop::collection::vec(bar(), 1..30),
        buffer_bps in 0i64..500,
    ) {
        let window = window_from(&bars, bars[0].1);
        let t = BreakoutThresholds::from_window(&window, Decimal::new(buffer_bps, 2));
        prop_assert!(t.short <= t.long, "short {} > long {}", t.short, t.long);
    }

    /// A close above the long threshold enters long with the sized
    /// quantity; below the short threshold enters short.
    #[test]
    fn breakout_direction_matches_price(
        bars in prop::collection::vec(bar(), 1..30),
        last in price(),
    ) {
        let e = engine(dec!(0.05));
        let window = window_from(&bars, last);
        let eval = e.evaluate(&window, &PositionState::Flat);

        match eval.decision {
            TradeDecision::EnterLong { quantity } => {
                prop_assert!(last > eval.thresholds.long);
                prop_assert_eq!(Some(quantity), e.size_entry(last));
            }
            TradeDecision::EnterShort { quantity } => {
                prop_assert!(last < eval.thresholds.short);
                prop_assert_eq!(Some(quantity), e.size_entry(last));
            }
            TradeDecision::NoAction(NoActionReason::WithinBand) => {
                prop_assert!(last <= eval.thresholds.long);
                prop_assert!(last >= eval.thresholds.short);
            }
            TradeDecision::NoAction(NoActionReason::QuantityRoundsToZero) => {
                prop_assert!(e.size_entry(last).is_none());
            }
            TradeDecision::NoAction(NoActionReason::PositionOpen) => {
                prop_assert!(false, "flat position reported as open");
            }
        }
    }

    /// Same inputs, same decision.
    #[test]
    fn evaluation_is_deterministic(
        bars in prop::collection::vec(bar(), 1..30),
        last in price(),
    ) {
        let e = engine(dec!(0.05));
        let window = window_from(&bars, last);
        prop_assert_eq!(
            e.evaluate(&window, &PositionState::Flat),
            e.evaluate(&window, &PositionState::Flat)
        );
    }
}

// ── Sizing ──────────────────────────────────────────────────

proptest! {
    /// Sized quantities are positive, keep at most four decimals, and
    /// stay within half a unit of the last place of notional / price.
    #[test]
    fn size_entry_rounds_to_precision(p in price(), notional_cents in 1i64..10_000_000) {
        let e = BreakoutEngine::new(dec!(0.05), Decimal::new(notional_cents, 2), 4);
        let exact = e.notional() / p;
        match e.size_entry(p) {
            Some(q) => {
                prop_assert!(q > Decimal::ZERO);
                prop_assert!(q.scale() <= 4, "scale {} for {q}", q.scale());
                prop_assert!((q - exact).abs() <= dec!(0.00005));
            }
            None => prop_assert!(exact <= dec!(0.00005)),
        }
    }
}
