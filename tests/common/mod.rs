#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tickerfolio::domain::error::TickerfolioError;
pub use tickerfolio::domain::price::{PriceBar, PriceSeries};
pub use tickerfolio::domain::transaction::{Transaction, TransactionKind};
use tickerfolio::ports::ledger_port::LedgerPort;
use tickerfolio::ports::price_port::PricePort;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), make_bars(symbol, prices));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TickerfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TickerfolioError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(PriceSeries::new(symbol, bars.clone())?),
            None => Err(TickerfolioError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, TickerfolioError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub struct MockLedgerPort {
    pub transactions: Vec<Transaction>,
}

impl MockLedgerPort {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

impl LedgerPort for MockLedgerPort {
    fn fetch_transactions(&self) -> Result<Vec<Transaction>, TickerfolioError> {
        Ok(self.transactions.clone())
    }
}

/// Midnight of 2024-01-01 plus `day` days.
pub fn ts(day: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(day)
}

pub fn make_bars(symbol: &str, prices: &[f64]) -> Vec<PriceBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PriceBar {
            symbol: symbol.to_string(),
            timestamp: ts(i as i64),
            price,
            volume: 1000 + i as u64,
        })
        .collect()
}

pub fn make_series(symbol: &str, prices: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, make_bars(symbol, prices)).unwrap()
}

pub fn tx(id: u64, symbol: &str, kind: TransactionKind, shares: f64, price: f64, day: i64) -> Transaction {
    Transaction {
        id,
        symbol: symbol.to_string(),
        kind,
        shares,
        price,
        timestamp: ts(day),
    }
}

pub fn buy(id: u64, symbol: &str, shares: f64, price: f64, day: i64) -> Transaction {
    tx(id, symbol, TransactionKind::Buy, shares, price, day)
}

pub fn sell(id: u64, symbol: &str, shares: f64, price: f64, day: i64) -> Transaction {
    tx(id, symbol, TransactionKind::Sell, shares, price, day)
}

/// Oscillating prices around `base` so every indicator has a non-trivial value.
pub fn wave(base: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| base + (i as f64 * 0.5).sin() * base * 0.05 + i as f64 * 0.1)
        .collect()
}

pub fn write_price_csv(dir: &Path, symbol: &str, prices: &[f64]) {
    let mut content = String::from("timestamp,price,volume\n");
    for (i, p) in prices.iter().enumerate() {
        content.push_str(&format!("{},{},{}\n", ts(i as i64).format("%Y-%m-%d"), p, 1000 + i));
    }
    fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}

pub fn write_ledger_csv(path: &Path, transactions: &[Transaction]) {
    let mut content = String::from("id,timestamp,symbol,kind,shares,price\n");
    for t in transactions {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            t.id,
            t.timestamp.format("%Y-%m-%d %H:%M:%S"),
            t.symbol,
            t.kind,
            t.shares,
            t.price
        ));
    }
    fs::write(path, content).unwrap();
}
