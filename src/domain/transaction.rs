//! Transactions and per-symbol ledgers.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "buy"),
            TransactionKind::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TransactionKind::Buy),
            "sell" => Ok(TransactionKind::Sell),
            other => Err(format!("unknown transaction kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: u64,
    pub symbol: String,
    pub kind: TransactionKind,
    pub shares: f64,
    pub price: f64,
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    fn validate(&self) -> Result<(), AnalyticsError> {
        if !self.shares.is_finite() || self.shares <= 0.0 {
            return Err(AnalyticsError::InvalidTransaction {
                id: self.id,
                reason: format!("shares must be positive, got {}", self.shares),
            });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(AnalyticsError::InvalidTransaction {
                id: self.id,
                reason: format!("price must be positive, got {}", self.price),
            });
        }
        Ok(())
    }
}

/// Transactions for a single symbol, held in replay order
/// (timestamp ascending, ties broken by id).
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    symbol: String,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(
        symbol: impl Into<String>,
        mut transactions: Vec<Transaction>,
    ) -> Result<Self, AnalyticsError> {
        let symbol = symbol.into();
        let mut seen = HashSet::with_capacity(transactions.len());

        for tx in &transactions {
            if tx.symbol != symbol {
                return Err(AnalyticsError::SymbolMismatch {
                    expected: symbol,
                    found: tx.symbol.clone(),
                });
            }
            if !seen.insert(tx.id) {
                return Err(AnalyticsError::DuplicateTransaction { id: tx.id });
            }
            tx.validate()?;
        }

        transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(Self {
            symbol,
            transactions,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
