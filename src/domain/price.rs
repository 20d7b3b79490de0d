//! Price bars and validated per-symbol price series.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::error::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub volume: u64,
}

/// Ordered bars for one symbol, strictly increasing in timestamp.
///
/// Only constructible through [`PriceSeries::new`], so every series the
/// indicator calculator sees has already passed input validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, AnalyticsError> {
        let symbol = symbol.into();

        for (index, bar) in bars.iter().enumerate() {
            if bar.symbol != symbol {
                return Err(AnalyticsError::InvalidBar {
                    symbol: symbol.clone(),
                    index,
                    reason: format!("bar belongs to {}", bar.symbol),
                });
            }
            if !bar.price.is_finite() || bar.price <= 0.0 {
                return Err(AnalyticsError::InvalidBar {
                    symbol: symbol.clone(),
                    index,
                    reason: format!("price must be positive, got {}", bar.price),
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(AnalyticsError::NonMonotonicSeries {
                    symbol: symbol.clone(),
                    index,
                    timestamp: bar.timestamp,
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The bar before the latest one, i.e. the previous session's close.
    pub fn previous(&self) -> Option<&PriceBar> {
        self.bars.len().checked_sub(2).map(|i| &self.bars[i])
    }

    /// Index of the last bar at or before `timestamp`.
    pub fn index_at_or_before(&self, timestamp: NaiveDateTime) -> Option<usize> {
        let pos = self.bars.partition_point(|b| b.timestamp <= timestamp);
        pos.checked_sub(1)
    }

    /// Simple returns between consecutive bars.
    pub fn returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|w| (w[1].price - w[0].price) / w[0].price)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, price: f64) -> PriceBar {
        PriceBar {
            symbol: "QTOP".into(),
            timestamp: ts(day),
            price,
            volume: 1_000,
        }
    }

    #[test]
    fn accepts_strictly_increasing_bars() {
        let series = PriceSeries::new("QTOP", vec![bar(1, 10.0), bar(2, 11.0), bar(5, 12.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.symbol(), "QTOP");
        let prices: Vec<f64> = series.bars().iter().map(|b| b.price).collect();
        assert_eq!(prices, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn empty_series_is_valid() {
        let series = PriceSeries::new("QTOP", vec![]).unwrap();
        assert!(series.is_empty());
        assert!(series.latest().is_none());
        assert!(series.previous().is_none());
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = PriceSeries::new("QTOP", vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::NonMonotonicSeries { index: 1, .. }
        ));
    }

    #[test]
    fn rejects_decreasing_timestamp() {
        let err =
            PriceSeries::new("QTOP", vec![bar(1, 10.0), bar(3, 11.0), bar(2, 12.0)]).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::NonMonotonicSeries { index: 2, .. }
        ));
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = PriceSeries::new("QTOP", vec![bar(1, 10.0), bar(2, 0.0)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidBar { index: 1, .. }));

        let err = PriceSeries::new("QTOP", vec![bar(1, f64::NAN)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidBar { index: 0, .. }));
    }

    #[test]
    fn rejects_foreign_symbol() {
        let mut other = bar(2, 11.0);
        other.symbol = "AAPL".into();
        let err = PriceSeries::new("QTOP", vec![bar(1, 10.0), other]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidBar { index: 1, .. }));
    }

    #[test]
    fn latest_and_previous() {
        let series = PriceSeries::new("QTOP", vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)]).unwrap();
        assert_eq!(series.latest().unwrap().price, 12.0);
        assert_eq!(series.previous().unwrap().price, 11.0);
    }

    #[test]
    fn index_at_or_before_handles_gaps() {
        let series = PriceSeries::new("QTOP", vec![bar(2, 10.0), bar(4, 11.0), bar(8, 12.0)]).unwrap();
        assert_eq!(series.index_at_or_before(ts(1)), None);
        assert_eq!(series.index_at_or_before(ts(2)), Some(0));
        assert_eq!(series.index_at_or_before(ts(5)), Some(1));
        assert_eq!(series.index_at_or_before(ts(20)), Some(2));
    }

    #[test]
    fn simple_returns() {
        let series = PriceSeries::new("QTOP", vec![bar(1, 10.0), bar(2, 11.0), bar(3, 9.9)]).unwrap();
        let returns = series.returns();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] - (-0.1)).abs() < 1e-12);
    }
}
