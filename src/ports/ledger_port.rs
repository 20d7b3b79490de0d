//! Transaction ledger access port trait.

use crate::domain::error::TickerfolioError;
use crate::domain::transaction::Transaction;

pub trait LedgerPort {
    fn fetch_transactions(&self) -> Result<Vec<Transaction>, TickerfolioError>;
}
