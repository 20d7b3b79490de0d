//! Property tests for analytics invariants.
//!
//! Uses proptest to verify:
//! 1. RSI stays within [0, 100]
//! 2. Bollinger bands stay ordered: upper >= middle >= lower
//! 3. MACD histogram is exactly line minus signal
//! 4. SMA and EMA of a constant series equal the constant
//! 5. Ledger replay never yields negative shares; overselling fails instead
//! 6. Snapshot rows are ordered by market value and sum to the total

mod common;

use common::*;
use proptest::prelude::*;
use std::collections::HashMap;
use tickerfolio::domain::error::AnalyticsError;
use tickerfolio::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    IndicatorValue,
};
use tickerfolio::domain::ledger::{apply, Holding, SHARE_EPSILON};
use tickerfolio::domain::snapshot::compose;
use tickerfolio::domain::transaction::Ledger;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_prices(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..120)
}

fn arb_shares() -> impl Strategy<Value = f64> {
    (1.0..100.0_f64).prop_map(|q| (q * 100.0).round() / 100.0)
}

// ── 1-4. Indicators ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_in_range(prices in arb_prices(2), period in 1usize..30) {
        let series = calculate_rsi(&make_bars("P", &prices), period);
        for point in series.values.iter().filter(|p| p.valid) {
            let v = point.value.as_simple().unwrap();
            prop_assert!((0.0..=100.0).contains(&v), "rsi {} out of range", v);
        }
    }

    #[test]
    fn bollinger_bands_ordered(
        prices in arb_prices(2),
        period in 1usize..30,
        multiplier in 0.001f64..4.0,
    ) {
        let series = calculate_bollinger(&make_bars("P", &prices), period, multiplier);
        for point in series.values.iter().filter(|p| p.valid) {
            match point.value {
                IndicatorValue::Bollinger { upper, middle, lower } => {
                    prop_assert!(upper >= middle);
                    prop_assert!(middle >= lower);
                }
                _ => prop_assert!(false, "unexpected value shape"),
            }
        }
    }

    #[test]
    fn macd_histogram_identity(
        prices in arb_prices(2),
        fast in 1usize..15,
        extra in 1usize..20,
        signal in 1usize..12,
    ) {
        let series = calculate_macd(&make_bars("P", &prices), fast, fast + extra, signal);
        for point in series.values.iter().filter(|p| p.valid) {
            match point.value {
                IndicatorValue::Macd { line, signal, histogram } => {
                    prop_assert_eq!(histogram, line - signal);
                }
                _ => prop_assert!(false, "unexpected value shape"),
            }
        }
    }

    #[test]
    fn constant_series_averages_to_constant(
        price in 1.0..1000.0_f64,
        len in 1usize..80,
        period in 1usize..40,
    ) {
        let bars = make_bars("P", &vec![price; len]);
        for series in [calculate_sma(&bars, period), calculate_ema(&bars, period)] {
            for point in series.values.iter().filter(|p| p.valid) {
                let v = point.value.as_simple().unwrap();
                prop_assert!((v - price).abs() <= price * 1e-12, "{} != {}", v, price);
            }
        }
    }
}

// ── 5. Ledger ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ledger_never_negative(ops in prop::collection::vec((any::<bool>(), arb_shares()), 1..40)) {
        let transactions: Vec<Transaction> = ops
            .iter()
            .enumerate()
            .map(|(i, (is_buy, shares))| {
                let kind = if *is_buy { TransactionKind::Buy } else { TransactionKind::Sell };
                tx(i as u64 + 1, "P", kind, *shares, 10.0, i as i64)
            })
            .collect();

        let mut held = 0.0_f64;
        let mut expected_oversell = None;
        for t in &transactions {
            match t.kind {
                TransactionKind::Buy => held += t.shares,
                TransactionKind::Sell => {
                    if t.shares > held + SHARE_EPSILON {
                        expected_oversell = Some(t.id);
                        break;
                    }
                    held -= t.shares;
                    if held <= SHARE_EPSILON {
                        held = 0.0;
                    }
                }
            }
        }

        let ledger = Ledger::new("P", transactions).unwrap();
        match (apply(&ledger), expected_oversell) {
            (Ok(holding), None) => {
                prop_assert!(holding.shares_outstanding >= 0.0);
                prop_assert!((holding.shares_outstanding - held).abs() < 1e-6);
            }
            (Err(AnalyticsError::Oversell { transaction_id, .. }), Some(id)) => {
                prop_assert_eq!(transaction_id, id);
            }
            (other, expected) => {
                prop_assert!(false, "got {:?}, expected oversell at {:?}", other, expected);
            }
        }
    }
}

// ── 6. Snapshot ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn snapshot_ordered_and_totalled(
        positions in prop::collection::vec((arb_shares(), 1.0..500.0_f64, 1.0..500.0_f64), 0..12)
    ) {
        let mut holdings = Vec::new();
        let mut latest = HashMap::new();
        for (i, (shares, cost, price)) in positions.iter().enumerate() {
            let symbol = format!("S{i:02}");
            holdings.push(Holding {
                symbol: symbol.clone(),
                shares_outstanding: *shares,
                average_cost: *cost,
                realized_gain: 0.0,
            });
            latest.insert(symbol, *price);
        }

        let snapshot = compose(&holdings, &latest, &latest).unwrap();
        prop_assert_eq!(snapshot.holdings.len(), holdings.len());

        let sum: f64 = snapshot.holdings.iter().map(|r| r.market_value).sum();
        prop_assert!((sum - snapshot.total_value).abs() <= 1e-9 * sum.max(1.0));
        prop_assert_eq!(snapshot.daily_change, 0.0);

        for pair in snapshot.holdings.windows(2) {
            prop_assert!(pair[0].market_value >= pair[1].market_value);
        }
    }
}
