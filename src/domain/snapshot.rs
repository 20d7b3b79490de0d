//! Portfolio valuation snapshot.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::error::{AnalyticsError, PriceKind};
use crate::domain::ledger::Holding;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRow {
    pub symbol: String,
    pub shares_outstanding: f64,
    pub average_cost: f64,
    pub realized_gain: f64,
    pub current_price: f64,
    pub previous_close: f64,
    pub market_value: f64,
    pub unrealized_gain: f64,
    pub unrealized_gain_pct: f64,
}

impl HoldingRow {
    fn new(holding: &Holding, current_price: f64, previous_close: f64) -> Self {
        let market_value = holding.shares_outstanding * current_price;
        let unrealized_gain_pct = if holding.average_cost == 0.0 {
            0.0
        } else {
            (current_price - holding.average_cost) / holding.average_cost * 100.0
        };

        HoldingRow {
            symbol: holding.symbol.clone(),
            shares_outstanding: holding.shares_outstanding,
            average_cost: holding.average_cost,
            realized_gain: holding.realized_gain,
            current_price,
            previous_close,
            market_value,
            unrealized_gain: market_value - holding.cost(),
            unrealized_gain_pct,
        }
    }

    pub fn cost(&self) -> f64 {
        self.shares_outstanding * self.average_cost
    }

    pub fn daily_change(&self) -> f64 {
        self.shares_outstanding * (self.current_price - self.previous_close)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,
    pub total_cost: f64,
    pub daily_change: f64,
    pub daily_change_pct: f64,
    pub total_realized_gain: f64,
    pub holdings: Vec<HoldingRow>,
}

/// Values `holdings` at `latest_prices`, with the day's move measured
/// against `previous_close_prices`.
///
/// Closed holdings (zero shares) produce no row and need no prices; their
/// realized gain still counts toward the total.
pub fn compose(
    holdings: &[Holding],
    latest_prices: &HashMap<String, f64>,
    previous_close_prices: &HashMap<String, f64>,
) -> Result<PortfolioSnapshot, AnalyticsError> {
    let mut rows = Vec::with_capacity(holdings.len());

    for holding in holdings.iter().filter(|h| h.is_open()) {
        let current = price_for(latest_prices, &holding.symbol, PriceKind::Latest)?;
        let previous = price_for(
            previous_close_prices,
            &holding.symbol,
            PriceKind::PreviousClose,
        )?;
        rows.push(HoldingRow::new(holding, current, previous));
    }

    rows.sort_by(|a, b| {
        b.market_value
            .total_cmp(&a.market_value)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let total_value: f64 = rows.iter().map(|r| r.market_value).sum();
    let total_cost: f64 = rows.iter().map(|r| r.cost()).sum();
    let daily_change: f64 = rows.iter().map(|r| r.daily_change()).sum();
    let total_realized_gain: f64 = holdings.iter().map(|h| h.realized_gain).sum();

    let base = total_value - daily_change;
    let daily_change_pct = if base == 0.0 {
        0.0
    } else {
        daily_change / base * 100.0
    };

    Ok(PortfolioSnapshot {
        total_value,
        total_cost,
        daily_change,
        daily_change_pct,
        total_realized_gain,
        holdings: rows,
    })
}

fn price_for(
    prices: &HashMap<String, f64>,
    symbol: &str,
    kind: PriceKind,
) -> Result<f64, AnalyticsError> {
    prices
        .get(symbol)
        .copied()
        .ok_or_else(|| AnalyticsError::MissingPrice {
            symbol: symbol.to_string(),
            kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn holding(symbol: &str, shares: f64, average_cost: f64) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            shares_outstanding: shares,
            average_cost,
            realized_gain: 0.0,
        }
    }

    fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(s, p)| (s.to_string(), *p))
            .collect()
    }

    #[test]
    fn empty_portfolio() {
        let snapshot = compose(&[], &HashMap::new(), &HashMap::new()).unwrap();
        assert_eq!(snapshot.total_value, 0.0);
        assert_eq!(snapshot.daily_change_pct, 0.0);
        assert!(snapshot.holdings.is_empty());
    }

    #[test]
    fn totals_and_ordering_by_market_value() {
        let holdings = vec![holding("A", 10.0, 4.0), holding("B", 2.0, 40.0)];
        let latest = prices(&[("A", 5.0), ("B", 50.0)]);
        let snapshot = compose(&holdings, &latest, &latest).unwrap();

        assert_relative_eq!(snapshot.total_value, 150.0);
        assert_relative_eq!(snapshot.total_cost, 120.0);
        assert_eq!(snapshot.holdings[0].symbol, "B");
        assert_eq!(snapshot.holdings[1].symbol, "A");
        assert_eq!(snapshot.daily_change, 0.0);
        assert_eq!(snapshot.daily_change_pct, 0.0);
    }

    #[test]
    fn ties_broken_by_symbol() {
        let holdings = vec![holding("ZZZ", 1.0, 1.0), holding("AAA", 2.0, 1.0)];
        let latest = prices(&[("ZZZ", 10.0), ("AAA", 5.0)]);
        let snapshot = compose(&holdings, &latest, &latest).unwrap();
        let order: Vec<&str> = snapshot.holdings.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "ZZZ"]);
    }

    #[test]
    fn daily_change_against_previous_close() {
        let holdings = vec![holding("A", 10.0, 4.0), holding("B", 2.0, 40.0)];
        let latest = prices(&[("A", 5.0), ("B", 50.0)]);
        let previous = prices(&[("A", 4.0), ("B", 55.0)]);
        let snapshot = compose(&holdings, &latest, &previous).unwrap();

        // A: 10 * (5-4) = 10, B: 2 * (50-55) = -10
        assert_relative_eq!(snapshot.daily_change, 0.0);

        let previous = prices(&[("A", 4.0), ("B", 45.0)]);
        let snapshot = compose(&holdings, &latest, &previous).unwrap();
        assert_relative_eq!(snapshot.daily_change, 20.0);
        assert_relative_eq!(snapshot.daily_change_pct, 20.0 / 130.0 * 100.0);
    }

    #[test]
    fn unrealized_gain_pct() {
        let holdings = vec![holding("A", 10.0, 4.0)];
        let latest = prices(&[("A", 5.0)]);
        let snapshot = compose(&holdings, &latest, &latest).unwrap();
        let row = &snapshot.holdings[0];
        assert_relative_eq!(row.unrealized_gain_pct, 25.0);
        assert_relative_eq!(row.unrealized_gain, 10.0);
        assert_relative_eq!(row.market_value, 50.0);
    }

    #[test]
    fn missing_latest_price() {
        let holdings = vec![holding("A", 10.0, 4.0)];
        let err = compose(&holdings, &HashMap::new(), &prices(&[("A", 4.0)])).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::MissingPrice {
                symbol: "A".into(),
                kind: PriceKind::Latest,
            }
        );
    }

    #[test]
    fn missing_previous_close() {
        let holdings = vec![holding("A", 10.0, 4.0)];
        let err = compose(&holdings, &prices(&[("A", 4.0)]), &HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::MissingPrice {
                kind: PriceKind::PreviousClose,
                ..
            }
        ));
    }

    #[test]
    fn closed_holdings_need_no_price() {
        let mut closed = holding("OLD", 0.0, 0.0);
        closed.realized_gain = 12.5;
        let holdings = vec![closed, holding("A", 1.0, 4.0)];
        let latest = prices(&[("A", 5.0)]);
        let snapshot = compose(&holdings, &latest, &latest).unwrap();

        assert_eq!(snapshot.holdings.len(), 1);
        assert_relative_eq!(snapshot.total_realized_gain, 12.5);
    }
}
