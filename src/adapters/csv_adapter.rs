//! CSV file adapters for price history and the transaction ledger.
//!
//! Price files live at `<prices_dir>/<SYMBOL>.csv` with a
//! `timestamp,price,volume` header. The ledger is a single file with an
//! `id,timestamp,symbol,kind,shares,price` header. Timestamps are either a
//! bare `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`.

use crate::domain::error::TickerfolioError;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::ports::ledger_port::LedgerPort;
use crate::ports::price_port::PricePort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TickerfolioError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TickerfolioError::NoData {
                symbol: symbol.to_string(),
            },
            _ => TickerfolioError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TickerfolioError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let timestamp = parse_timestamp(field(&record, 0, "timestamp", row)?).ok_or_else(|| {
                TickerfolioError::Data {
                    reason: format!("{}: row {}: invalid timestamp", path.display(), row + 1),
                }
            })?;

            let price: f64 = field(&record, 1, "price", row)?
                .parse()
                .map_err(|e| TickerfolioError::Data {
                    reason: format!("{}: row {}: invalid price value: {}", path.display(), row + 1, e),
                })?;

            let volume: u64 = field(&record, 2, "volume", row)?
                .parse()
                .map_err(|e| TickerfolioError::Data {
                    reason: format!("{}: row {}: invalid volume value: {}", path.display(), row + 1, e),
                })?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                timestamp,
                price,
                volume,
            });
        }

        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded price history");
        Ok(PriceSeries::new(symbol, bars)?)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TickerfolioError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TickerfolioError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TickerfolioError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            match name_str.strip_suffix(".csv") {
                Some(symbol) if !symbol.is_empty() => symbols.push(symbol.to_string()),
                _ => debug!(file = %name_str, "ignoring non-CSV entry"),
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

pub struct CsvLedgerAdapter {
    path: PathBuf,
}

impl CsvLedgerAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl LedgerPort for CsvLedgerAdapter {
    fn fetch_transactions(&self) -> Result<Vec<Transaction>, TickerfolioError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TickerfolioError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut transactions = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TickerfolioError::Data {
                reason: format!("{}: CSV parse error: {}", self.path.display(), e),
            })?;
            let bad = |what: &str, detail: String| TickerfolioError::Data {
                reason: format!("{}: row {}: invalid {}: {}", self.path.display(), row + 1, what, detail),
            };

            let id: u64 = field(&record, 0, "id", row)?
                .parse()
                .map_err(|e: std::num::ParseIntError| bad("id", e.to_string()))?;

            let raw_ts = field(&record, 1, "timestamp", row)?;
            let timestamp =
                parse_timestamp(raw_ts).ok_or_else(|| bad("timestamp", raw_ts.to_string()))?;

            let symbol = field(&record, 2, "symbol", row)?.to_uppercase();
            if symbol.is_empty() {
                return Err(bad("symbol", "empty".to_string()));
            }

            let kind: TransactionKind = field(&record, 3, "kind", row)?
                .parse()
                .map_err(|e: String| bad("kind", e))?;

            let shares: f64 = field(&record, 4, "shares", row)?
                .parse()
                .map_err(|e: std::num::ParseFloatError| bad("shares", e.to_string()))?;

            let price: f64 = field(&record, 5, "price", row)?
                .parse()
                .map_err(|e: std::num::ParseFloatError| bad("price", e.to_string()))?;

            transactions.push(Transaction {
                id,
                symbol,
                kind,
                shares,
                price,
                timestamp,
            });
        }

        debug!(transactions = transactions.len(), path = %self.path.display(), "loaded ledger");
        Ok(transactions)
    }
}

/// Parses the timestamp forms accepted in price and ledger files.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'r str, TickerfolioError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| TickerfolioError::Data {
            reason: format!("row {}: missing {} column", row + 1, name),
        })
}
