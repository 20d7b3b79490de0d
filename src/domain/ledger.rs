//! Ledger replay into holdings using the weighted-average cost method.
//!
//! BUY s @ p:  avg = (shares*avg + s*p) / (shares + s); shares += s
//! SELL s @ p: realized += s*(p - avg); shares -= s; avg unchanged
//! A position that returns to zero resets avg to 0.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::domain::error::AnalyticsError;
use crate::domain::transaction::{Ledger, Transaction, TransactionKind};

/// Share quantities closer than this are treated as equal.
pub const SHARE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub shares_outstanding: f64,
    pub average_cost: f64,
    pub realized_gain: f64,
}

impl Holding {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Holding {
            symbol: symbol.into(),
            shares_outstanding: 0.0,
            average_cost: 0.0,
            realized_gain: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.shares_outstanding > 0.0
    }

    pub fn cost(&self) -> f64 {
        self.shares_outstanding * self.average_cost
    }

    fn buy(&mut self, shares: f64, price: f64) {
        let new_shares = self.shares_outstanding + shares;
        self.average_cost =
            (self.shares_outstanding * self.average_cost + shares * price) / new_shares;
        self.shares_outstanding = new_shares;
    }

    fn sell(&mut self, tx: &Transaction) -> Result<(), AnalyticsError> {
        if tx.shares > self.shares_outstanding + SHARE_EPSILON {
            return Err(AnalyticsError::Oversell {
                symbol: self.symbol.clone(),
                transaction_id: tx.id,
                requested: tx.shares,
                held: self.shares_outstanding,
            });
        }

        // A sell within SHARE_EPSILON above the holding closes it; gain is
        // realized only on shares actually held.
        let sold = tx.shares.min(self.shares_outstanding);
        self.realized_gain += sold * (tx.price - self.average_cost);
        self.shares_outstanding -= sold;

        if self.shares_outstanding <= SHARE_EPSILON {
            self.shares_outstanding = 0.0;
            self.average_cost = 0.0;
        }
        Ok(())
    }
}

/// Replays a ledger into the resulting holding.
pub fn apply(ledger: &Ledger) -> Result<Holding, AnalyticsError> {
    ledger
        .transactions()
        .iter()
        .try_fold(Holding::empty(ledger.symbol()), |mut holding, tx| {
            match tx.kind {
                TransactionKind::Buy => holding.buy(tx.shares, tx.price),
                TransactionKind::Sell => holding.sell(tx)?,
            }
            Ok(holding)
        })
}

/// Splits a mixed transaction list into per-symbol ledgers and replays each.
/// Holdings come back ordered by symbol.
pub fn apply_all(transactions: &[Transaction]) -> Result<Vec<Holding>, AnalyticsError> {
    let mut seen_ids = HashSet::with_capacity(transactions.len());
    let mut by_symbol: BTreeMap<&str, Vec<Transaction>> = BTreeMap::new();
    for tx in transactions {
        if !seen_ids.insert(tx.id) {
            return Err(AnalyticsError::DuplicateTransaction { id: tx.id });
        }
        by_symbol
            .entry(tx.symbol.as_str())
            .or_default()
            .push(tx.clone());
    }

    by_symbol
        .into_iter()
        .map(|(symbol, txs)| apply(&Ledger::new(symbol, txs)?))
        .collect()
}
