//! Price history access port trait.

use crate::domain::error::TickerfolioError;
use crate::domain::price::PriceSeries;

pub trait PricePort {
    /// Full validated history for `symbol`, oldest bar first.
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TickerfolioError>;

    fn list_symbols(&self) -> Result<Vec<String>, TickerfolioError>;
}
